use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use iobc_supervisor::{
    CommandKind, FrameCodec, HousekeepingRecord, SimulatedSupervisor, Supervisor,
    SupervisorConfig, SupervisorError, TelemetryRecord, VersionRecord,
};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "iOBC supervisor diagnostic tool", long_about = None)]
struct Args {
    /// Path to TOML configuration (checksum variant, simulated telemetry)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Retry queries that fail with a length or checksum error
    #[arg(long, default_value_t = 0, global = true)]
    retries: u32,

    /// Corrupt the checksum of the next N simulated replies
    #[arg(long, default_value_t = 0, global = true)]
    inject_faults: u32,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read supervisor version and configuration
    Version,
    /// Read housekeeping telemetry
    Housekeeping,
    /// Controlled reset of the host
    Reset,
    /// Immediate reset without safe shutdown
    EmergencyReset,
    /// Power-cycle the host
    PowerCycle,
    /// Compute the link CRC-8 of a hex string
    Crc { hex: String },
    /// Decode a captured reply frame given as hex
    Decode {
        #[arg(value_enum)]
        shape: FrameShape,
        hex: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FrameShape {
    Version,
    Housekeeping,
    Generic,
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(&args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SupervisorConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SupervisorConfig::default(),
    };
    let codec = FrameCodec::new(config.checksum);

    match &args.command {
        Command::Crc { hex } => {
            let bytes = parse_hex(hex)?;
            println!("0x{:02X}", codec.crc().checksum(&bytes));
            return Ok(());
        }
        Command::Decode { shape, hex } => {
            let bytes = parse_hex(hex)?;
            let record = match shape {
                FrameShape::Version => codec.decode_reply(CommandKind::GetVersion, &bytes)?,
                FrameShape::Housekeeping => {
                    codec.decode_reply(CommandKind::GetHousekeeping, &bytes)?
                }
                FrameShape::Generic => TelemetryRecord::Generic(codec.decode_generic_reply(&bytes)?),
            };
            return print_record(&record, args.json);
        }
        _ => {}
    }

    let mut sim = SimulatedSupervisor::with_checksum(
        config.simulator.clone().unwrap_or_default(),
        config.checksum,
    );
    sim.corrupt_next_replies(args.inject_faults);
    info!("Using simulated supervisor");
    let mut supervisor = Supervisor::with_config(sim, &config);

    match &args.command {
        Command::Version => {
            let record = with_retries(args.retries, || supervisor.get_version())?;
            print_record(&TelemetryRecord::Version(record), args.json)
        }
        Command::Housekeeping => {
            let record = with_retries(args.retries, || supervisor.get_housekeeping())?;
            print_record(&TelemetryRecord::Housekeeping(record), args.json)
        }
        Command::Reset => report_sent(supervisor.reset(), CommandKind::Reset, args.json),
        Command::EmergencyReset => report_sent(
            supervisor.emergency_reset(),
            CommandKind::EmergencyReset,
            args.json,
        ),
        Command::PowerCycle => {
            report_sent(supervisor.power_cycle(), CommandKind::PowerCycle, args.json)
        }
        Command::Crc { .. } | Command::Decode { .. } => Ok(()),
    }
}

/// Retry a query on decode failures; transport failures end the attempt.
fn with_retries<R>(
    retries: u32,
    mut op: impl FnMut() -> Result<R, SupervisorError>,
) -> Result<R, SupervisorError> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(e) if !e.is_transport() && attempt < retries => {
                attempt += 1;
                warn!(attempt, retries, error = %e, "Query failed, retrying");
            }
            result => return result,
        }
    }
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: String = input
        .split_whitespace()
        .map(|chunk| chunk.trim_start_matches("0x"))
        .collect();
    hex::decode(&digits).map_err(|e| anyhow!("invalid hex input: {e}"))
}

#[derive(Serialize)]
struct Sent {
    command: CommandKind,
    sent: bool,
}

fn report_sent(result: Result<(), SupervisorError>, command: CommandKind, json: bool) -> Result<()> {
    result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&Sent { command, sent: true })?);
    } else {
        // Fire-and-forget: the only confirmation is transport acceptance.
        println!("{command}: sent");
    }
    Ok(())
}

fn print_record(record: &TelemetryRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    match record {
        TelemetryRecord::Generic(r) => println!("Command status:     {}", r.command_status),
        TelemetryRecord::Version(r) => print_version(r),
        TelemetryRecord::Housekeeping(r) => print_housekeeping(r),
    }
    Ok(())
}

fn print_version(r: &VersionRecord) {
    println!("Command status:     {}", r.command_status);
    println!("Subsystem index:    {}", r.subsystem_index);
    println!("Version:            {}", r.version_string());
    println!("Git head:           {:08X}", r.git_head);
    println!("Serial number:      {}", r.serial_number);
    println!("Build:              {}", r.build_description());
    println!("Clock speed:        {} MHz", r.clock_speed);
    println!("Code type:          {}", r.code_type);
}

fn print_housekeeping(r: &HousekeepingRecord) {
    let es = &r.enable_status;
    println!("Command status:     {}", r.command_status);
    println!("Enable status:      0b{:08b}", es.raw());
    println!("  OBC power:        {}", es.obc_power());
    println!("  RTC power:        {}", es.rtc_power());
    println!("  Supervisor mode:  {}", es.supervisor_mode());
    println!("  RTC busy:         {}", es.rtc_busy());
    println!("  RTC power-off:    {}", es.rtc_power_off());
    println!("Supervisor uptime:  {} s", r.supervisor_uptime);
    println!("iOBC uptime:        {} s", r.iobc_uptime);
    println!("iOBC reset count:   {}", r.iobc_reset_count);
    for (channel, value) in r.adc_data.iter().enumerate() {
        println!("ADC[{channel}]:             {value}");
    }
    println!("ADC updated:        {}", r.adc_updated());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("00 0a FF").unwrap(), vec![0x00, 0x0A, 0xFF]);
        assert_eq!(parse_hex("0x31 0x32").unwrap(), b"12".to_vec());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_with_retries_recovers_from_checksum_faults() {
        let mut sim = SimulatedSupervisor::default();
        sim.corrupt_next_replies(2);
        let mut supervisor = Supervisor::new(sim);

        let hk = with_retries(2, || supervisor.get_housekeeping());
        assert!(hk.is_ok());
        assert_eq!(supervisor.transport().exchanges(), 3);
    }

    #[test]
    fn test_with_retries_gives_up() {
        let mut sim = SimulatedSupervisor::default();
        sim.corrupt_next_replies(5);
        let mut supervisor = Supervisor::new(sim);

        let err = with_retries(1, || supervisor.get_version()).unwrap_err();
        assert!(err.is_checksum_mismatch());
        assert_eq!(supervisor.transport().exchanges(), 2);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from(["iobc-sup", "--retries", "3", "housekeeping"]).unwrap();
        assert_eq!(args.retries, 3);
        assert!(matches!(args.command, Command::Housekeeping));

        let args = Args::try_parse_from(["iobc-sup", "decode", "generic", "000000"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Decode {
                shape: FrameShape::Generic,
                ..
            }
        ));
    }
}
