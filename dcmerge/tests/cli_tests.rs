use std::fs::{create_dir_all, read_to_string, write};

use indoc::indoc;
use pretty_assertions::assert_eq;

macro_rules! get_bin {
	() => {
		assert_cmd::Command::cargo_bin("dcmerge").expect("Failed to find the app binary")
	};
}

const BASE: &str = indoc! {"
	services:
	  app:
	    image: example/app:1.0
	    environment:
	      - TZ=UTC
	    ports:
	      - 0.0.0.0:8080:8080
	    networks:
	      proxy:
"};

const OVERRIDE: &str = indoc! {"
	services:
	  app:
	    image: example/app:2.0
	    environment:
	      - TZ=Europe/Berlin
	    ports:
	      - 0.0.0.0:8080:80
	    networks:
	      db:
	  db:
	    image: postgres:16
"};

fn write_sources(dir: &std::path::Path) -> (String, String) {
	let base = dir.join("base.yaml");
	let over = dir.join("override.yaml");

	write(&base, BASE).expect("Failed to write the base document");
	write(&over, OVERRIDE).expect("Failed to write the override document");

	(
		base.display().to_string(),
		over.display().to_string(),
	)
}

#[test]
fn additive_by_default() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let (base, over) = write_sources(dir.path());

	let output = get_bin!().args([&base, &over]).output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		indoc! {"
			services:
			  app:
			    environment:
			    - TZ=UTC
			    image: example/app:1.0
			    networks:
			      proxy: null
			    ports:
			    - 0.0.0.0:8080:8080
			  db:
			    image: postgres:16
		"}
	);

	Ok(())
}

#[test]
fn last_win_to_file() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let (base, over) = write_sources(dir.path());
	let output_path = dir.path().join("out/compose.yaml");

	get_bin!()
		.args([base.as_str(), over.as_str(), "--last-win", "-o"])
		.arg(&output_path)
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		read_to_string(&output_path)?,
		indoc! {"
			services:
			  app:
			    environment:
			    - TZ=Europe/Berlin
			    image: example/app:2.0
			    networks:
			      proxy: null
			      db: null
			    ports:
			    - 0.0.0.0:8080:80
			  db:
			    image: postgres:16
		"}
	);

	Ok(())
}

#[test]
fn existing_win_with_file_url() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let (base, over) = write_sources(dir.path());

	let output = get_bin!()
		.args([format!("file://{base}"), over, "-f".to_string()])
		.output()?;

	assert!(output.status.success());

	let stdout = String::from_utf8(output.stdout)?;
	assert!(stdout.contains("image: example/app:1.0"));
	assert!(stdout.contains("- TZ=UTC"));
	assert!(stdout.contains("db: null"));

	Ok(())
}

#[test]
fn conflicting_policies() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let (base, over) = write_sources(dir.path());

	get_bin!()
		.args([base.as_str(), over.as_str(), "-f", "-l"])
		.assert()
		.failure()
		.code(2)
		.stdout("");

	Ok(())
}

#[test]
fn missing_sources() {
	get_bin!().assert().failure().code(2);
}

#[test]
fn directory_source() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let nested = dir.path().join("compose.d");
	create_dir_all(&nested)?;

	let output = get_bin!().arg(&nested).output()?;

	assert!(!output.status.success());
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8(output.stderr)?.contains("is a directory"));

	Ok(())
}

#[test]
fn unsupported_scheme() -> Result<(), Box<dyn std::error::Error>> {
	let output = get_bin!().arg("ftp://example.com/compose.yaml").output()?;

	assert!(!output.status.success());
	assert!(String::from_utf8(output.stderr)?.contains("is not supported"));

	Ok(())
}

#[test]
fn invalid_yaml() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let broken = dir.path().join("broken.yaml");
	write(&broken, "services: [")?;

	let output = get_bin!().arg(&broken).output()?;

	assert!(!output.status.success());
	assert!(String::from_utf8(output.stderr)?.contains("Error while deserializing"));

	Ok(())
}
