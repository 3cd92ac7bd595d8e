use std::time::Duration;

use anyhow::Result;
use clap::{
    arg, crate_authors, crate_name, crate_version, value_parser, ArgAction, ArgGroup, ArgMatches,
    Command,
};
use log::LevelFilter;
use pad::PadStr;
use pscan::{
    config::{ScanConfig, DEFAULT_TIMEOUT, DEFAULT_WORKERS},
    error::ScanError,
    logger,
    port::PortRange,
    scan::{ScanReport, ScanType, Scanner},
};

const HOST_COLUMN_WIDTH: usize = 24;

struct ParsedArgs {
    debug: bool,
    config: ScanConfig,
    techniques: Vec<ScanType>,
}

fn parse_args(matches: ArgMatches) -> Result<ParsedArgs, ScanError> {
    let debug = matches.get_flag("debug");

    let ports = matches
        .get_one::<String>("ports")
        .map_or_else(|| PortRange::new(20, 100), |raw| raw.parse())?;

    let mut techniques: Vec<ScanType> = matches
        .get_many::<clap::Id>("techniques")
        .into_iter()
        .flatten()
        .filter_map(|id| ScanType::from_id(id.as_str()))
        .collect();
    techniques.sort();
    techniques.dedup();

    let targets = matches.get_many::<String>("targets").into_iter().flatten();
    let workers = matches
        .get_one::<usize>("workers")
        .copied()
        .unwrap_or(DEFAULT_WORKERS);
    let timeout = matches
        .get_one::<u64>("timeout")
        .map_or(DEFAULT_TIMEOUT, |ms| Duration::from_millis(*ms));

    let kind = techniques.first().copied().unwrap_or(ScanType::Tcp);
    let config = ScanConfig::new(kind, targets.cloned(), ports)?
        .with_workers(workers)?
        .with_timeout(timeout)?;

    Ok(ParsedArgs {
        debug,
        config,
        techniques,
    })
}

fn print_results(report: &ScanReport, ports: PortRange) {
    let mut out = format!(
        "{} scan of ports {} took {:.4}s\n\n",
        report.kind,
        ports,
        report.elapsed.as_secs_f32()
    );
    out.push_str(&format!(
        "{}Open Ports\n",
        "Host".pad_to_width(HOST_COLUMN_WIDTH)
    ));

    report.iter().for_each(|hr| {
        let open = if hr.open.is_empty() {
            String::from("none")
        } else {
            hr.open
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!(
            "{}{}\n",
            hr.host.pad_to_width(HOST_COLUMN_WIDTH),
            open
        ));

        hr.failures
            .iter()
            .for_each(|e| out.push_str(&format!("    ! {}\n", e)));
    });

    println!("{}", out);
}

fn main() -> Result<()> {
    let arg_matches = Command::new(crate_name!())
        .about(
            "Port scanner for multiple hosts over TCP (connect) and UDP (empty datagram probe).\n\
            Only scan hosts you are authorized to.",
        )
        .version(crate_version!())
        .arg_required_else_help(true)
        .author(crate_authors!())
        .args([
            // Miscellaneous arguments.
            arg!(-d --debug "Turns on debugging information").action(ArgAction::SetTrue),
            arg!(-p --ports <RANGE> "Port or inclusive range of ports (e.g. 22 or 20-100)")
                .default_value("20-100"),
            arg!(-w --workers <N> "Number of hosts scanned concurrently")
                .value_parser(value_parser!(usize))
                .default_value("10"),
            arg!(--timeout <MS> "Time to wait for each probe, in milliseconds")
                .value_parser(value_parser!(u64))
                .default_value("1000"),
            arg!(<targets> ... "Addresses or hostnames to scan"),
        ])
        .args([
            // Scan techniques.
            arg!(-t --tcp "TCP connect scan").action(ArgAction::SetTrue),
            arg!(-u --udp "UDP probe scan").action(ArgAction::SetTrue),
        ])
        .group(
            ArgGroup::new("techniques")
                .args(["tcp", "udp"])
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Extract arguments.
    let parsed = parse_args(arg_matches)?;

    // Failures are always reported, debug adds progress.
    logger::init(if parsed.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    // One dispatch per technique, TCP first.
    for kind in parsed.techniques {
        let config = parsed.config.clone().with_kind(kind);
        let ports = config.ports();
        let report = Scanner::new(config).start()?;

        print_results(&report, ports);
    }

    Ok(())
}
