#[cfg(test)]
pub mod test {
    use std::fmt;
    use std::str::FromStr;

    use crate::error::ConfError;
    use crate::fields::{Schema, Settings};

    #[derive(Debug, PartialEq)]
    pub struct TestConfig {
        pub host: String,
        pub port: u16,
        pub debug: bool,
        pub database: TestDbConfig,
        pub tags: Vec<String>,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                host: "localhost".into(),
                port: 8080,
                debug: false,
                database: TestDbConfig::default(),
                tags: Vec::new(),
            }
        }
    }

    impl Settings for TestConfig {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("host", "default:localhost,help:the application 'host'", &mut self.host)?;
            schema.field("port", "short:p,default:8080,help:the port number", &mut self.port)?;
            schema.field("debug", "short:d,help:enable debug mode", &mut self.debug)?;
            schema.nested("database", "", &mut self.database)?;
            schema.field("tags", "", &mut self.tags)?;
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    pub struct TestDbConfig {
        pub url: Option<String>,
        pub pool_size: usize,
    }

    impl Default for TestDbConfig {
        fn default() -> Self {
            Self {
                url: None,
                pool_size: 5,
            }
        }
    }

    impl Settings for TestDbConfig {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("url", "noprint,help:connection string", &mut self.url)?;
            schema.field("pool_size", "default:5", &mut self.pool_size)?;
            Ok(())
        }
    }

    /// CamelCase members, as declared by callers porting existing schemas.
    #[derive(Debug, Default, PartialEq)]
    pub struct Flat {
        pub test_int: i64,
        pub test_string: String,
        pub test_bool: bool,
        pub skipped: String,
    }

    impl Settings for Flat {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("TestInt", "", &mut self.test_int)?;
            schema.field("TestString", "", &mut self.test_string)?;
            schema.field("TestBool", "", &mut self.test_bool)?;
            schema.field("Skipped", "-", &mut self.skipped)?;
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct FieldOne {
        pub field_one: String,
    }

    impl Settings for FieldOne {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("FieldOne", "", &mut self.field_one)
        }
    }

    /// A named nested record followed by a plain leaf.
    #[derive(Debug, Default, PartialEq)]
    pub struct Hierarchical {
        pub one: FieldOne,
        pub field_two: String,
    }

    impl Settings for Hierarchical {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.nested("One", "", &mut self.one)?;
            schema.field("FieldTwo", "", &mut self.field_two)
        }
    }

    /// The same record embedded anonymously.
    #[derive(Debug, Default, PartialEq)]
    pub struct Promoted {
        pub inner: FieldOne,
        pub field_two: String,
    }

    impl Settings for Promoted {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.embedded("FieldOne", "", &mut self.inner)?;
            schema.field("FieldTwo", "", &mut self.field_two)
        }
    }

    /// `host:port`, a record that decodes itself from one string.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Endpoint {
        pub host: String,
        pub port: u16,
    }

    impl Default for Endpoint {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".into(),
                port: 443,
            }
        }
    }

    impl FromStr for Endpoint {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (host, port) = s
                .rsplit_once(':')
                .ok_or_else(|| format!("expected host:port, got {s:?}"))?;
            let port = port.parse().map_err(|e| format!("bad port: {e}"))?;
            Ok(Self {
                host: host.to_string(),
                port,
            })
        }
    }

    impl fmt::Display for Endpoint {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}:{}", self.host, self.port)
        }
    }

    crate::text_value!(Endpoint);

    impl Settings for Endpoint {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("host", "", &mut self.host)?;
            schema.field("port", "", &mut self.port)
        }

        fn as_value(&mut self) -> Option<&mut dyn crate::Value> {
            Some(self)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct TlsConfig {
        pub cert: Endpoint,
        pub port: u16,
    }

    impl Settings for TlsConfig {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.nested("cert", "", &mut self.cert)?;
            schema.field("port", "default:8443", &mut self.port)
        }
    }

    /// An optional nested record and an optional leaf.
    #[derive(Debug, Default, PartialEq)]
    pub struct WithTls {
        pub tls: Option<TlsConfig>,
        pub timeout: Option<u32>,
    }

    impl Settings for WithTls {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.optional("tls", "", &mut self.tls)?;
            schema.field("timeout", "help:request timeout in 'seconds'", &mut self.timeout)
        }
    }

    /// A field that must come from some source.
    #[derive(Debug, Default, PartialEq)]
    pub struct Required {
        pub needed_value: String,
    }

    impl Settings for Required {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
            schema.field("NeededValue", "required", &mut self.needed_value)
        }
    }

    /// Describes nothing.
    #[derive(Debug, Default)]
    pub struct Empty;

    impl Settings for Empty {
        fn describe<'a>(&'a mut self, _schema: &mut Schema<'a>) -> Result<(), ConfError> {
            Ok(())
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
    }

    #[test]
    fn endpoint_round_trips_through_text() {
        let endpoint: Endpoint = "db.local:5432".parse().unwrap();
        assert_eq!(endpoint.to_string(), "db.local:5432");
        assert!("db.local".parse::<Endpoint>().is_err());
    }
}
