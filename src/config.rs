use clap::builder::FalseyValueParser;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Clone, Debug)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    // tcp port, only used when the unix socket can't be bound
    #[clap(long, env, default_value = "8080")]
    pub port: u16,

    // unix socket the proxy prefers to listen on, relative to the working dir
    #[clap(long, env, default_value = "socket/http-proxy.sock")]
    pub socket_path: String,

    // path the proxy is mounted under, e.g. /videoplayback proxied behind /ytproxy would be
    // PREFIX_PATH=/ytproxy. Rewritten manifest urls get this in front of them
    #[clap(long, env, default_value = "")]
    pub prefix_path: String,

    // DISABLE_IPV6=1 forces every upstream connection over ipv4
    #[clap(long, env, value_parser = FalseyValueParser::new())]
    pub disable_ipv6: bool,

    // DISABLE_WEBP=1 sends thumbnails as the jpegs upstream gave us
    #[clap(long, env, value_parser = FalseyValueParser::new())]
    pub disable_webp: bool,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,

    // prometheus exporter port, no exporter is started without it
    #[clap(long, env)]
    pub metrics_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 8080,
            socket_path: "socket/http-proxy.sock".to_string(),
            prefix_path: String::new(),
            disable_ipv6: false,
            disable_webp: false,
            sentry_dsn: None,
            metrics_port: None,
        }
    }
}
