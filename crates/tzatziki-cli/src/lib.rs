//! Tzatziki CLI: argument parsing and the report run behind the `tzatziki` binary.
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tzatziki_core::{json, TagDictionaryLoader};
use tzatziki_report::{Configuration, Localization, ReportBuilder};

pub fn cli() -> Command {
    Command::new("tzatziki")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a test execution report with consolidated tag views")
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Execution file ({\"features\": [...]})"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Report file to write"),
        )
        .arg(
            Arg::new("dictionary")
                .long("dictionary")
                .value_parser(value_parser!(PathBuf))
                .help("Tag dictionary (UTF-8 properties)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Report configuration (YAML mapping)"),
        )
        .arg(
            Arg::new("l10n")
                .long("l10n")
                .value_parser(value_parser!(PathBuf))
                .help("Localization overrides (YAML mapping)"),
        )
        .arg(Arg::new("title").long("title").help("Report title"))
        .arg(
            Arg::new("sample-steps")
                .long("sample-steps")
                .action(ArgAction::SetTrue)
                .help("Append the sample steps section"),
        )
}

/// Parsed command line
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub l10n: Option<PathBuf>,
    pub title: Option<String>,
    pub sample_steps: bool,
}

impl Args {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            input: matches
                .get_one::<PathBuf>("input")
                .cloned()
                .context("missing input file")?,
            output: matches
                .get_one::<PathBuf>("output")
                .cloned()
                .context("missing output file")?,
            dictionary: matches.get_one::<PathBuf>("dictionary").cloned(),
            config: matches.get_one::<PathBuf>("config").cloned(),
            l10n: matches.get_one::<PathBuf>("l10n").cloned(),
            title: matches.get_one::<String>("title").cloned(),
            sample_steps: matches.get_flag("sample-steps"),
        })
    }
}

/// Load every input and write the report
pub fn run(args: &Args) -> Result<()> {
    let features = json::load_file(&args.input)
        .with_context(|| format!("failed to load execution file {}", args.input.display()))?;

    let mut builder = ReportBuilder::new();
    if let Some(path) = &args.config {
        let configuration = Configuration::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        builder.using(&configuration)?;
    }
    if let Some(title) = &args.title {
        builder.title(title.as_str())?;
    }
    if let Some(path) = &args.l10n {
        let l10n = Localization::defaults()
            .with_overrides_from_file(path)
            .with_context(|| format!("failed to load localization {}", path.display()))?;
        builder.localization(l10n)?;
    }
    if let Some(path) = &args.dictionary {
        let dictionary = TagDictionaryLoader::from_utf8_file(path)
            .with_context(|| format!("failed to load tag dictionary {}", path.display()))?;
        builder.tag_dictionary(dictionary)?;
    }

    builder.default_overview()?.features(features)?;
    if args.sample_steps {
        builder.sample_steps()?;
    }

    builder
        .generate_to_path(&args.output)
        .with_context(|| format!("failed to write report {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), "report written");
    Ok(())
}
