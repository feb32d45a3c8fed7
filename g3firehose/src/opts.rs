/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
#[cfg(unix)]
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
#[cfg(unix)]
use clap::ValueHint;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::info;
use tokio::runtime::Runtime;

use g3_statsd_client::{MetricsName, StatsdBackend, StatsdClientConfig};

use crate::kind::MetricKind;
use crate::runner::KindConfig;
use crate::tags::MetricTags;
use crate::value::ValueMode;

const GLOBAL_ARG_STATSD: &str = "statsd";
#[cfg(unix)]
const GLOBAL_ARG_STATSD_UNIX: &str = "statsd-unix";
const GLOBAL_ARG_PACKET_SIZE: &str = "packet-size";
const GLOBAL_ARG_NAMESPACE: &str = "namespace";
const GLOBAL_ARG_TAGS: &str = "tags";
const GLOBAL_ARG_VALUE_MODE: &str = "value-mode";
const GLOBAL_ARG_RANDOM: &str = "random";
const GLOBAL_ARG_REPORT_INTERVAL: &str = "report-interval";
const GLOBAL_ARG_THREADS: &str = "threads";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

const DEFAULT_NAMESPACE: &str = "firehose";
const DEFAULT_TAGS: &str = "source:firehose";

struct KindArgs {
    kind: MetricKind,
    count: &'static str,
    interval: &'static str,
    freq: &'static str,
}

const KIND_ARGS: [KindArgs; 4] = [
    KindArgs {
        kind: MetricKind::Gauge,
        count: "gauge-count",
        interval: "gauge-interval",
        freq: "gauge-freq",
    },
    KindArgs {
        kind: MetricKind::Counter,
        count: "counter-count",
        interval: "counter-interval",
        freq: "counter-freq",
    },
    KindArgs {
        kind: MetricKind::Distribution,
        count: "dist-count",
        interval: "dist-interval",
        freq: "dist-freq",
    },
    KindArgs {
        kind: MetricKind::Histogram,
        count: "hist-count",
        interval: "hist-interval",
        freq: "hist-freq",
    },
];

pub struct ProcArgs {
    pub verbose_level: u8,
    statsd_config: StatsdClientConfig,
    tags: MetricTags,
    value_mode: ValueMode,
    kinds: Vec<KindConfig>,
    report_interval: Duration,
    threads: Option<NonZeroUsize>,
}

impl Default for ProcArgs {
    fn default() -> Self {
        ProcArgs {
            verbose_level: 0,
            statsd_config: StatsdClientConfig::default(),
            tags: MetricTags::default(),
            value_mode: ValueMode::Fixed,
            kinds: MetricKind::ALL.into_iter().map(KindConfig::new).collect(),
            report_interval: Duration::from_secs(1),
            threads: None,
        }
    }
}

impl ProcArgs {
    pub fn summary(&self) {
        info!("statsd backend: {:?}", self.statsd_config.backend());
        info!(
            "namespace: {}, packet size: {}, value mode: {}",
            self.statsd_config.prefix(),
            self.statsd_config.cache_size,
            self.value_mode.as_str()
        );
        info!("tags: {}", self.tags.iter().collect::<Vec<_>>().join(","));
        for config in &self.kinds {
            info!(
                "{}: count {}, freq {}, interval {:?}",
                config.kind(),
                config.count,
                config.freq,
                config.interval
            );
        }
    }

    #[inline]
    pub fn statsd_config(&self) -> &StatsdClientConfig {
        &self.statsd_config
    }

    #[inline]
    pub fn tags(&self) -> &MetricTags {
        &self.tags
    }

    #[inline]
    pub fn value_mode(&self) -> ValueMode {
        self.value_mode
    }

    #[inline]
    pub fn kinds(&self) -> &[KindConfig] {
        &self.kinds
    }

    #[inline]
    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    pub fn main_runtime(&self) -> io::Result<Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all().thread_name("firehose-main");
        if let Some(n) = self.threads {
            builder.worker_threads(n.get());
        }
        builder.build()
    }
}

fn add_kind_args(mut app: Command) -> Command {
    for args in &KIND_ARGS {
        let name = args.kind.as_str();
        app = app
            .arg(
                Arg::new(args.count)
                    .help(format!("Number of distinct {name} items"))
                    .value_name("COUNT")
                    .long(args.count)
                    .num_args(1)
                    .value_parser(value_parser!(usize))
                    .default_value("0"),
            )
            .arg(
                Arg::new(args.interval)
                    .help(format!("Cycle interval of the {name} schedule"))
                    .value_name("DURATION")
                    .long(args.interval)
                    .num_args(1)
                    .default_value("1s"),
            )
            .arg(
                Arg::new(args.freq)
                    .help(format!("Emissions per {name} item in each cycle"))
                    .value_name("FREQ")
                    .long(args.freq)
                    .num_args(1)
                    .value_parser(value_parser!(usize))
                    .default_value("1"),
            );
    }
    app
}

pub fn add_global_args(app: Command) -> Command {
    let app = app
        .arg(
            Arg::new(GLOBAL_ARG_STATSD)
                .help("Set the udp statsd target address")
                .value_name("UDP SOCKET ADDRESS")
                .long(GLOBAL_ARG_STATSD)
                .num_args(1)
                .value_parser(value_parser!(SocketAddr))
                .default_value("127.0.0.1:8125"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PACKET_SIZE)
                .help("Max size of the batched statsd payload")
                .value_name("SIZE")
                .long(GLOBAL_ARG_PACKET_SIZE)
                .num_args(1)
                .default_value("512"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_NAMESPACE)
                .help("Prefix of all the metric names")
                .value_name("NAME")
                .long(GLOBAL_ARG_NAMESPACE)
                .num_args(1)
                .default_value(DEFAULT_NAMESPACE),
        )
        .arg(
            Arg::new(GLOBAL_ARG_TAGS)
                .help("Comma separated tags added to all metrics")
                .value_name("TAGS")
                .long(GLOBAL_ARG_TAGS)
                .num_args(1)
                .default_value(DEFAULT_TAGS),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VALUE_MODE)
                .help("How to generate the metric values")
                .long(GLOBAL_ARG_VALUE_MODE)
                .num_args(1)
                .value_parser(["fixed", "random"])
                .default_value("fixed"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_RANDOM)
                .help("Use random values, same as --value-mode random")
                .long(GLOBAL_ARG_RANDOM)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(GLOBAL_ARG_REPORT_INTERVAL)
                .help("Interval between two progress reports")
                .value_name("DURATION")
                .long(GLOBAL_ARG_REPORT_INTERVAL)
                .num_args(1)
                .default_value("1s"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_THREADS)
                .help("Number of threads of the main runtime")
                .value_name("THREAD NUMBER")
                .long(GLOBAL_ARG_THREADS)
                .num_args(1)
                .value_parser(value_parser!(NonZeroUsize)),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose output, repeat to show more")
                .short('v')
                .long(GLOBAL_ARG_VERBOSE)
                .action(ArgAction::Count),
        );
    #[cfg(unix)]
    let app = app.arg(
        Arg::new(GLOBAL_ARG_STATSD_UNIX)
            .help("Set the unix statsd target address, overrides the udp one")
            .value_name("UNIX SOCKET ADDRESS")
            .long(GLOBAL_ARG_STATSD_UNIX)
            .num_args(1)
            .value_hint(ValueHint::FilePath)
            .value_parser(value_parser!(PathBuf)),
    );
    add_kind_args(app)
}

fn parse_kind_args(args: &ArgMatches, proc_args: &mut ProcArgs) -> anyhow::Result<()> {
    for (kind_args, config) in KIND_ARGS.iter().zip(proc_args.kinds.iter_mut()) {
        if let Some(n) = args.get_one::<usize>(kind_args.count) {
            config.count = *n;
        }
        if let Some(n) = args.get_one::<usize>(kind_args.freq) {
            config.freq = *n;
        }
        if let Some(interval) = g3_clap::humanize::get_duration(args, kind_args.interval)? {
            config.interval = interval;
        }
        config
            .check()
            .map_err(|e| anyhow!("invalid {} schedule: {e}", config.kind()))?;
    }
    Ok(())
}

pub fn parse_global_args(args: &ArgMatches) -> anyhow::Result<ProcArgs> {
    let mut proc_args = ProcArgs::default();

    proc_args.verbose_level = args.get_count(GLOBAL_ARG_VERBOSE);

    let namespace = args
        .get_one::<String>(GLOBAL_ARG_NAMESPACE)
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_NAMESPACE);
    let prefix = MetricsName::from_str(namespace)
        .map_err(|e| anyhow!("invalid namespace {namespace}: {e}"))?;
    proc_args.statsd_config.set_prefix(prefix);

    if let Some(addr) = args.get_one::<SocketAddr>(GLOBAL_ARG_STATSD) {
        proc_args
            .statsd_config
            .set_backend(StatsdBackend::Udp(*addr, None));
    }
    #[cfg(unix)]
    if let Some(path) = args.get_one::<PathBuf>(GLOBAL_ARG_STATSD_UNIX) {
        proc_args
            .statsd_config
            .set_backend(StatsdBackend::Unix(path.clone()));
    }
    if let Some(size) = g3_clap::humanize::get_usize(args, GLOBAL_ARG_PACKET_SIZE)? {
        if size == 0 {
            return Err(anyhow!("packet size should not be zero"));
        }
        proc_args.statsd_config.cache_size = size;
    }

    if let Some(s) = args.get_one::<String>(GLOBAL_ARG_TAGS) {
        proc_args.tags = MetricTags::from_str(s).context(format!("invalid tags {s}"))?;
    }

    if let Some(s) = args.get_one::<String>(GLOBAL_ARG_VALUE_MODE) {
        proc_args.value_mode =
            ValueMode::from_str(s).map_err(|_| anyhow!("invalid value mode {s}"))?;
    }
    if args.get_flag(GLOBAL_ARG_RANDOM) {
        proc_args.value_mode = ValueMode::Random;
    }

    if let Some(interval) = g3_clap::humanize::get_duration(args, GLOBAL_ARG_REPORT_INTERVAL)? {
        if interval.is_zero() {
            return Err(anyhow!("report interval should not be zero"));
        }
        proc_args.report_interval = interval;
    }

    if let Some(n) = args.get_one::<NonZeroUsize>(GLOBAL_ARG_THREADS) {
        proc_args.threads = Some(*n);
    }

    parse_kind_args(args, &mut proc_args)?;
    Ok(proc_args)
}
