//! Configuration records for the layerconf demo application.
//!
//! The root [`DemoConfig`] holds two scalar fields and two nested records,
//! [`ServerConfig`] and [`DisplayConfig`]. The API token is `noprint`, so it
//! never appears in the `env` listing.
//!
//! # Name mapping
//!
//! With the prefix `CONF_DEMO`, every field is reachable three ways:
//!
//! | Flag                        | Env var                             | Config file line         |
//! |-----------------------------|-------------------------------------|--------------------------|
//! | `--name`                    | `CONF_DEMO_NAME`                    | `NAME demo`              |
//! | `--verbose` / `-v`          | `CONF_DEMO_VERBOSE`                 | `VERBOSE`                |
//! | `--server-host`             | `CONF_DEMO_SERVER_HOST`             | `SERVER_HOST 0.0.0.0`    |
//! | `--server-port` / `-p`      | `CONF_DEMO_SERVER_PORT`             | `SERVER_PORT 8080`       |
//! | `--server-max-connections`  | `CONF_DEMO_SERVER_MAX_CONNECTIONS`  | `SERVER_MAX_CONNECTIONS 50` |
//! | `--server-api-token`        | `CONF_DEMO_SERVER_API_TOKEN`        | `SERVER_API_TOKEN s3cr3t` |
//! | `--display-color`           | `CONF_DEMO_DISPLAY_COLOR`           | `DISPLAY_COLOR red`      |
//! | `--display-format`          | `CONF_DEMO_DISPLAY_FORMAT`          | `DISPLAY_FORMAT plain`   |
//! | `--display-tags`            | `CONF_DEMO_DISPLAY_TAGS`            | `DISPLAY_TAGS a,b`       |

use layerconf::{ConfError, Schema, Settings};

/// Root configuration for the demo application.
#[derive(Debug, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub server: ServerConfig,
    pub display: DisplayConfig,
}

impl Settings for DemoConfig {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
        schema.field("name", "default:conf-demo,help:name shown in the echo banner", &mut self.name)?;
        schema.field("verbose", "short:v,help:enable verbose output", &mut self.verbose)?;
        schema.nested("server", "", &mut self.server)?;
        schema.nested("display", "", &mut self.display)
    }
}

/// Server settings.
#[derive(Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub api_token: Option<String>,
}

impl Settings for ServerConfig {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
        schema.field("host", "default:127.0.0.1,help:'address' to bind to", &mut self.host)?;
        schema.field("port", "short:p,default:3000,help:port to listen on", &mut self.port)?;
        schema.field("max_connections", "default:100", &mut self.max_connections)?;
        schema.field("api_token", "noprint,help:token for the upstream API", &mut self.api_token)
    }
}

/// Display and formatting settings.
#[derive(Debug, Default)]
pub struct DisplayConfig {
    pub color: String,
    pub format: String,
    pub tags: Vec<String>,
}

impl Settings for DisplayConfig {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
        schema.field(
            "color",
            "default:yellow,help:banner color (red green yellow blue magenta cyan)",
            &mut self.color,
        )?;
        schema.field("format", "default:table,help:'table' or plain output", &mut self.format)?;
        schema.field("tags", "help:labels printed after the banner", &mut self.tags)
    }
}
