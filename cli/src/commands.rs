pub mod info;
pub mod run;
pub mod scan;

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

use assetronics_common::config::{
    AgentConfig, ApiConfig, Config, DEFAULT_API_URL, DEFAULT_MAX_CONCURRENCY, ProbeMethod,
    ScanConfig,
};

#[derive(Parser)]
#[command(name = "assetronics-agent", version)]
#[command(about = "Asset inventory agent: host check-ins and network discovery.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the inventory service
    #[arg(long, env = "ASSETRONICS_URL", default_value = DEFAULT_API_URL, global = true)]
    pub url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "ASSETRONICS_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,

    /// Tenant the reports belong to
    #[arg(long, env = "ASSETRONICS_TENANT", global = true)]
    pub tenant: Option<String>,

    /// Seconds between two check-ins
    #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..), global = true)]
    pub interval: u64,

    /// Hosts probed at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    pub concurrency: usize,

    /// Stop a sweep after this many seconds and report what was found
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), global = true)]
    pub deadline: Option<u64>,

    /// Reachability method: auto, ping, icmp or tcp
    #[arg(long, default_value = "auto", global = true)]
    pub probe: ProbeMethod,

    /// Skip reverse DNS lookups
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Print payloads as JSON instead of uploading them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less output (-q hides decorations, -qq hides host details)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check in now and then on every interval until stopped
    #[command(alias = "r")]
    Run,
    /// Sweep a CIDR range once and upload the discovered devices
    #[command(alias = "s")]
    Scan { target: String },
    /// Show the facts this agent reports about the local machine
    #[command(alias = "i")]
    Info,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        Config {
            api: ApiConfig {
                api_url: self.url.clone(),
                api_key: self.key.clone(),
                tenant_id: self.tenant.clone(),
                ..ApiConfig::default()
            },
            scan: ScanConfig {
                max_concurrency: self.concurrency,
                probe_method: self.probe,
                no_dns: self.no_dns,
                scan_deadline: self.deadline.map(Duration::from_secs),
                ..ScanConfig::default()
            },
            agent: AgentConfig {
                interval: Duration::from_secs(self.interval),
            },
            dry_run: self.dry_run,
            quiet: self.quiet,
        }
    }
}

/// Uploads need a tenant. Dry runs never upload.
pub fn require_tenant(cfg: &Config) -> anyhow::Result<()> {
    let missing = cfg
        .api
        .tenant_id
        .as_deref()
        .is_none_or(|tenant| tenant.trim().is_empty());
    if missing && !cfg.dry_run {
        anyhow::bail!("a tenant id is required (--tenant or ASSETRONICS_TENANT)");
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> CommandLine {
        let argv = std::iter::once("assetronics-agent").chain(args.iter().copied());
        CommandLine::try_parse_from(argv).unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn scan_flags_reach_scan_config() {
        let cli = parse(&[
            "scan",
            "192.168.1.0/24",
            "--tenant",
            "acme",
            "--concurrency",
            "8",
            "--deadline",
            "30",
            "--probe",
            "tcp",
            "--no-dns",
        ]);

        let Commands::Scan { ref target } = cli.command else {
            panic!("expected scan subcommand");
        };
        assert_eq!(target, "192.168.1.0/24");

        let cfg = cli.to_config();
        assert_eq!(cfg.api.tenant_id.as_deref(), Some("acme"));
        assert_eq!(cfg.scan.max_concurrency, 8);
        assert_eq!(cfg.scan.scan_deadline, Some(Duration::from_secs(30)));
        assert_eq!(cfg.scan.probe_method, ProbeMethod::Tcp);
        assert!(cfg.scan.no_dns);
        assert_eq!(cfg.scan.fingerprint_ports, ScanConfig::default().fingerprint_ports);
    }

    #[test]
    fn unknown_probe_method_is_rejected() {
        let argv = ["assetronics-agent", "scan", "10.0.0.0/24", "--probe", "arp"];
        assert!(CommandLine::try_parse_from(argv).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let argv = ["assetronics-agent", "run", "--interval", "0"];
        assert!(CommandLine::try_parse_from(argv).is_err());
    }

    #[test]
    fn tenant_is_required_unless_dry_run() {
        let mut cfg = Config::default();
        assert!(require_tenant(&cfg).is_err());

        cfg.api.tenant_id = Some("  ".to_string());
        assert!(require_tenant(&cfg).is_err());

        cfg.dry_run = true;
        assert!(require_tenant(&cfg).is_ok());

        cfg.dry_run = false;
        cfg.api.tenant_id = Some("acme".to_string());
        assert!(require_tenant(&cfg).is_ok());
    }
}
