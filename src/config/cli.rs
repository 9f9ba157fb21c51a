use crate::config::toml_config::{AppConfig, Variant};
use crate::core::encoder::FeatureFields;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "titanic-survival")]
#[command(about = "Train Titanic survival classifiers and serve predictions over HTTP")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeArgs),
    /// Fit one or all classifiers and write their model files
    Train(TrainArgs),
    /// Predict survival for one passenger from the command line
    Predict(PredictArgs),
    /// Print death statistics for a gender
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Model code used when a request names none (dt, svc, lr)
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// dt, svc, lr or all
    #[arg(short, long, default_value = "all")]
    pub algorithm: String,

    /// Log CPU and memory per training phase
    #[arg(long)]
    pub monitor: bool,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long)]
    pub sex: String,

    #[arg(long)]
    pub pclass: Option<String>,

    #[arg(long)]
    pub age: Option<String>,

    #[arg(long)]
    pub sibsp: Option<String>,

    #[arg(long)]
    pub parch: Option<String>,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub sex: String,
}

impl ServeArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(variant) = self.variant {
            config.server.variant = variant;
        }
        if let Some(model) = &self.model {
            config.model.default_code = model.clone();
        }
    }
}

impl PredictArgs {
    pub fn fields(&self) -> FeatureFields {
        FeatureFields {
            sex: Some(self.sex.clone()),
            pclass: self.pclass.clone(),
            age: self.age.clone(),
            sibsp: self.sibsp.clone(),
            parch: self.parch.clone(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags_override_config() {
        let cli = Cli::parse_from([
            "titanic-survival",
            "serve",
            "--port",
            "9000",
            "--variant",
            "welcome",
            "--model",
            "dt",
        ]);
        let mut config = AppConfig::default();
        match cli.command {
            Command::Serve(args) => args.apply(&mut config),
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.variant, Variant::Welcome);
        assert_eq!(config.model.default_code, "dt");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_train_defaults_to_all() {
        let cli = Cli::parse_from(["titanic-survival", "-v", "train"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.algorithm, "all");
                assert!(!args.monitor);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
