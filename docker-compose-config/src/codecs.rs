use std::{
	fmt::{self, Display},
	sync::LazyLock,
};

use regex::Regex;

/// Separates the key from the value in `environment` and `labels` entries.
pub const KEY_VALUE_DELIMITER: char = '=';
/// Separates the segments of a `volumes` entry.
pub const VOLUME_DELIMITER: char = ':';
/// Separates the ip and port segments of a `ports` entry.
pub const PORT_DELIMITER: char = ':';
/// Introduces the protocol suffix of a `ports` entry.
pub const PORT_PROTOCOL_DELIMITER: char = '/';

static PORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^(?:(?P<src_ip>(?:[0-9]{1,3}\.){3}[0-9]{1,3}):)?(?P<src_port>[0-9]{1,5}):(?:(?P<dst_ip>(?:[0-9]{1,3}\.){3}[0-9]{1,3}):)?(?P<dst_port>[0-9]{1,5})(?:/(?P<protocol>[a-z]*))?$",
	)
	.expect("Failed to initialize the port mapping regex")
});

/// A delimiter-encoded sequence entry that carries its own identity.
///
/// Sequences of these entries behave like maps: at most one entry may exist for each identity.
pub trait KeyedEntry: Display + Sized {
	fn parse(text: &str) -> Self;

	/// Whether the two entries address the same slot of a keyed set.
	fn collides_with(&self, other: &Self) -> bool;
}

/// A `KEY=VALUE` entry, as used by `environment` and `labels`.
///
/// The key ends at the first `=`, so the value may contain more `=` characters.
/// An entry without `=` (such as `HOME`, which tells compose to forward the variable from the host)
/// has no value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyValue {
	pub key: String,
	pub value: Option<String>,
}

impl KeyValue {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: Some(value.into()),
		}
	}
}

impl KeyedEntry for KeyValue {
	fn parse(text: &str) -> Self {
		match text.split_once(KEY_VALUE_DELIMITER) {
			Some((key, value)) => Self::new(key, value),
			None => Self {
				key: text.to_string(),
				value: None,
			},
		}
	}

	fn collides_with(&self, other: &Self) -> bool {
		self.key == other.key
	}
}

impl Display for KeyValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.value {
			Some(value) => write!(f, "{}{KEY_VALUE_DELIMITER}{value}", self.key),
			None => write!(f, "{}", self.key),
		}
	}
}

/// A `SRC:DEST[:PERM]` entry of a service's `volumes`.
///
/// Entries are identified by their destination path.
/// A single segment (an anonymous volume such as `/data`) is parsed as the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindMount {
	pub source: String,
	pub destination: String,
	pub permission: Option<String>,
}

impl BindMount {
	pub fn new(
		source: impl Into<String>,
		destination: impl Into<String>,
		permission: Option<String>,
	) -> Self {
		Self {
			source: source.into(),
			destination: destination.into(),
			permission: permission.filter(|perm| !perm.is_empty()),
		}
	}
}

impl KeyedEntry for BindMount {
	fn parse(text: &str) -> Self {
		let mut parts = text.split(VOLUME_DELIMITER);

		let first = parts.next().unwrap_or_default();

		let Some(destination) = parts.next() else {
			return Self::new("", first, None);
		};

		Self::new(first, destination, parts.next().map(str::to_string))
	}

	fn collides_with(&self, other: &Self) -> bool {
		self.destination == other.destination
	}
}

impl Display for BindMount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.source.is_empty() {
			write!(f, "{}{VOLUME_DELIMITER}", self.source)?;
		}

		write!(f, "{}", self.destination)?;

		if let Some(perm) = &self.permission {
			write!(f, "{VOLUME_DELIMITER}{perm}")?;
		}

		Ok(())
	}
}

/// A `[SRC_IP:]SRC_PORT:[DST_IP:]DST_PORT[/PROTOCOL]` entry of a service's `ports`.
///
/// Text that does not have this shape (a bare container port, a port range...) is kept as it is,
/// and all of its components are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortMapping {
	raw: String,
	src_ip: String,
	src_port: String,
	dst_ip: String,
	dst_port: String,
	protocol: String,
}

impl PortMapping {
	pub fn src_ip(&self) -> &str {
		&self.src_ip
	}

	pub fn src_port(&self) -> &str {
		&self.src_port
	}

	pub fn dst_ip(&self) -> &str {
		&self.dst_ip
	}

	pub fn dst_port(&self) -> &str {
		&self.dst_port
	}

	pub fn protocol(&self) -> &str {
		&self.protocol
	}

	pub fn has_src_ip(&self) -> bool {
		!self.src_ip.is_empty()
	}

	pub fn has_src_port(&self) -> bool {
		!self.src_port.is_empty()
	}

	pub fn has_dst_ip(&self) -> bool {
		!self.dst_ip.is_empty()
	}

	pub fn has_dst_port(&self) -> bool {
		!self.dst_port.is_empty()
	}

	pub fn has_protocol(&self) -> bool {
		!self.protocol.is_empty()
	}

	/// Whether the text matched the port mapping pattern.
	pub fn is_parsed(&self) -> bool {
		self.has_src_port() && self.has_dst_port()
	}

	/// The source identity of the mapping: `IP:PORT`, or `PORT` if there is no source ip.
	pub fn src(&self) -> String {
		join_ip_and_port(&self.src_ip, &self.src_port)
	}

	/// The destination of the mapping: `IP:PORT`, or `PORT` if there is no destination ip.
	pub fn dst(&self) -> String {
		join_ip_and_port(&self.dst_ip, &self.dst_port)
	}
}

fn join_ip_and_port(ip: &str, port: &str) -> String {
	if ip.is_empty() {
		port.to_string()
	} else {
		format!("{ip}{PORT_DELIMITER}{port}")
	}
}

impl KeyedEntry for PortMapping {
	fn parse(text: &str) -> Self {
		let raw = text.to_string();

		let Some(captures) = PORT_REGEX.captures(text) else {
			return Self {
				raw,
				..Default::default()
			};
		};

		let group = |name: &str| {
			captures
				.name(name)
				.map(|m| m.as_str().to_string())
				.unwrap_or_default()
		};

		Self {
			src_ip: group("src_ip"),
			src_port: group("src_port"),
			dst_ip: group("dst_ip"),
			dst_port: group("dst_port"),
			protocol: group("protocol"),
			raw,
		}
	}

	/// Two mappings collide when they bind the same source.
	///
	/// The source ips are only compared when both mappings define one. Otherwise only the source
	/// ports are compared. Mappings that could not be parsed have empty components, so they collide
	/// with each other and with nothing else.
	fn collides_with(&self, other: &Self) -> bool {
		if self.has_src_ip() && other.has_src_ip() {
			self.src() == other.src()
		} else {
			self.src_port == other.src_port
		}
	}
}

impl Display for PortMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.is_parsed() {
			return write!(f, "{}", self.raw);
		}

		write!(f, "{}{PORT_DELIMITER}{}", self.src(), self.dst())?;

		if self.has_protocol() {
			write!(f, "{PORT_PROTOCOL_DELIMITER}{}", self.protocol)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn key_value_splits_on_first_delimiter() {
		let entry = KeyValue::parse("JAVA_OPTS=-Dfoo=bar -Xmx1g");

		assert_eq!(entry.key, "JAVA_OPTS");
		assert_eq!(entry.value.as_deref(), Some("-Dfoo=bar -Xmx1g"));
		assert_eq!(entry.to_string(), "JAVA_OPTS=-Dfoo=bar -Xmx1g");
	}

	#[test]
	fn key_value_without_value() {
		let entry = KeyValue::parse("HOME");

		assert_eq!(entry.key, "HOME");
		assert_eq!(entry.value, None);
		assert_eq!(entry.to_string(), "HOME");

		let empty_value = KeyValue::parse("HOME=");
		assert_eq!(empty_value.value.as_deref(), Some(""));
		assert_eq!(empty_value.to_string(), "HOME=");
	}

	#[test]
	fn key_values_collide_by_key() {
		let left = KeyValue::parse("prometheus.io/scrape=true");

		assert!(left.collides_with(&KeyValue::parse("prometheus.io/scrape=false")));
		assert!(!left.collides_with(&KeyValue::parse("prometheus.io/port=9090")));
	}

	#[test]
	fn bind_mount_segments() {
		let mount = BindMount::parse("/etc/localtime:/etc/localtime:ro");

		assert_eq!(mount.source, "/etc/localtime");
		assert_eq!(mount.destination, "/etc/localtime");
		assert_eq!(mount.permission.as_deref(), Some("ro"));
		assert_eq!(mount.to_string(), "/etc/localtime:/etc/localtime:ro");

		let without_perm = BindMount::parse("data:/var/lib/data:");
		assert_eq!(without_perm.permission, None);
		assert_eq!(without_perm.to_string(), "data:/var/lib/data");
	}

	#[test]
	fn anonymous_volume_is_a_destination() {
		let mount = BindMount::parse("/var/cache");

		assert_eq!(mount.source, "");
		assert_eq!(mount.destination, "/var/cache");
		assert_eq!(mount.to_string(), "/var/cache");
	}

	#[test]
	fn bind_mounts_collide_by_destination() {
		let existing = BindMount::parse("/etc/localtime:/etc/localtime");
		let incoming = BindMount::parse("/usr/share/zoneinfo/Europe/Berlin:/etc/localtime");

		assert!(existing.collides_with(&incoming));
		assert!(!existing.collides_with(&BindMount::parse("/etc/localtime:/etc/timezone")));
	}

	#[test]
	fn port_mapping_components() {
		let port = PortMapping::parse("127.0.0.1:8080:10.0.0.2:80/tcp");

		assert_eq!(port.src_ip(), "127.0.0.1");
		assert_eq!(port.src_port(), "8080");
		assert_eq!(port.dst_ip(), "10.0.0.2");
		assert_eq!(port.dst_port(), "80");
		assert_eq!(port.protocol(), "tcp");
		assert_eq!(port.src(), "127.0.0.1:8080");
		assert_eq!(port.dst(), "10.0.0.2:80");
		assert_eq!(port.to_string(), "127.0.0.1:8080:10.0.0.2:80/tcp");

		let short = PortMapping::parse("80:80");
		assert!(!short.has_src_ip());
		assert!(!short.has_protocol());
		assert_eq!(short.src(), "80");
		assert_eq!(short.to_string(), "80:80");
	}

	#[test]
	fn unparsable_port_keeps_its_text() {
		let port = PortMapping::parse("8000-8010:8000-8010");

		assert!(!port.is_parsed());
		assert_eq!(port.src(), "");
		assert_eq!(port.dst(), "");
		assert_eq!(port.to_string(), "8000-8010:8000-8010");
	}

	#[test]
	fn port_collision_table() {
		let cases = [
			("0.0.0.0:8080:80", "0.0.0.0:8080:8080", true),
			("0.0.0.0:8080:80", "127.0.0.1:8080:8080", false),
			("8080:80", "127.0.0.1:8080:8080", true),
			("127.0.0.1:8080:80", "8080:8080", true),
			("8080:80", "8080:8080/udp", true),
			("8080:80", "8443:443", false),
			("127.0.0.1:8080:80", "8443:443", false),
		];

		for (new, existing, expected) in cases {
			let new = PortMapping::parse(new);
			let existing = PortMapping::parse(existing);

			assert_eq!(
				new.collides_with(&existing),
				expected,
				"{new} against {existing}"
			);
		}
	}

	#[test]
	fn unparsable_ports_share_an_empty_source() {
		let bare = PortMapping::parse("80");

		assert!(bare.collides_with(&PortMapping::parse("80")));
		assert!(bare.collides_with(&PortMapping::parse("443")));
		assert!(bare.collides_with(&PortMapping::parse("8000-8010:8000-8010")));
		assert!(!bare.collides_with(&PortMapping::parse("80:80")));
		assert!(!bare.collides_with(&PortMapping::parse("127.0.0.1:80:80")));
	}
}
