use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};

use liturgy_bible_backend::bible_api::BibleApiClient;
use liturgy_bible_backend::book_registry::BookRegistry;
use liturgy_bible_backend::logger;
use liturgy_bible_backend::osis_parser::try_parse_osis_file;
use liturgy_bible_backend::site_generator::{generate_site, generate_site_from_api, load_xml_sources, GenerationStats};
use liturgy_bible_backend::site_settings::SiteSettings;
use liturgy_bible_backend::zefania_parser::{try_parse_zefania_file, ZefaniaParseOptions};
use liturgy_bible_backend::{NumberFailurePolicy, SourceFormat, DEFAULT_SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Liturgy Bible site generator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a JSON settings file.
    /// Defaults to liturgy-bible.json in the current directory, if it exists.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "LITURGY_BIBLE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Path to a JSON book list to use instead of the built-in Catholic canon.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "LITURGY_BIBLE_REGISTRY")]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate chapter pages from the OSIS and Zefania XML files
    Generate {
        /// OSIS XML file (KJV)
        #[arg(long, value_name = "FILE_PATH", env = "LITURGY_BIBLE_OSIS")]
        osis: Option<PathBuf>,

        /// Zefania XML file (DRA)
        #[arg(long, value_name = "FILE_PATH", env = "LITURGY_BIBLE_ZEFANIA")]
        zefania: Option<PathBuf>,

        #[arg(long, value_name = "DIRECTORY_PATH", env = "LITURGY_BIBLE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Label of the translation shown first on each page
        #[arg(long, value_name = "LABEL")]
        default_translation: Option<String>,

        /// How far a bad chapter or verse number in the Zefania file reaches
        #[arg(long, value_enum)]
        number_failure_policy: Option<FailurePolicyArg>,

        /// Only write pages which don't exist yet
        #[arg(long, default_value_t = false)]
        only_missing: bool,
    },

    /// Generate chapter pages with text fetched from bible-api.com
    Fetch {
        /// Comma separated book names, e.g. "Psalms,Proverbs"
        #[arg(long, value_delimiter = ',')]
        books: Option<Vec<String>>,

        #[arg(long, value_name = "DIRECTORY_PATH", env = "LITURGY_BIBLE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Only fetch and write pages which don't exist yet
        #[arg(long, default_value_t = false)]
        only_missing: bool,

        #[arg(long, value_name = "URL", env = "LITURGY_BIBLE_API_URL")]
        api_url: Option<String>,

        /// Pause after every request, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Parse one XML file and write the extracted text as JSON
    #[command(arg_required_else_help = true)]
    Extract {
        /// Source dialect: osis or zefania
        #[arg(long, value_name = "FORMAT")]
        format: SourceFormat,

        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(long, value_name = "FILE_PATH")]
        out: Option<PathBuf>,

        #[arg(long, value_enum)]
        number_failure_policy: Option<FailurePolicyArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FailurePolicyArg {
    Node,
    File,
}

impl From<FailurePolicyArg> for NumberFailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Node => NumberFailurePolicy::NodeLevel,
            FailurePolicyArg::File => NumberFailurePolicy::FileLevel,
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<SiteSettings> {
    match path {
        Some(p) => SiteSettings::load(p),
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                SiteSettings::load(default_path)
            } else {
                Ok(SiteSettings::default())
            }
        }
    }
}

fn load_registry(path: Option<&Path>) -> Result<BookRegistry> {
    match path {
        Some(p) => BookRegistry::load(p),
        None => Ok(BookRegistry::catholic()),
    }
}

fn books_progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

fn print_stats(stats: &GenerationStats, output_dir: &Path) {
    println!("Pages written: {}", stats.pages_written);
    if stats.pages_existing > 0 {
        println!("Pages already present: {}", stats.pages_existing);
    }
    println!("Chapters without text: {}", stats.chapters_without_text);
    println!("Output directory: {:?}", output_dir);
}

fn generate(
    settings: &SiteSettings,
    registry: &BookRegistry,
    osis: Option<&Path>,
    zefania: Option<&Path>,
) -> Result<()> {
    if osis.is_none() && zefania.is_none() {
        anyhow::bail!("Provide at least one of --osis or --zefania");
    }

    let sources = load_xml_sources(osis, zefania, settings)?;

    let pb = books_progress_bar(registry.len())?;
    let stats = generate_site(&sources, registry, settings, |book| {
        pb.set_message(book.name.clone());
        pb.inc(1);
    })?;
    pb.finish_with_message("Done");

    print_stats(&stats, &settings.output_dir);
    Ok(())
}

fn fetch(settings: &SiteSettings, registry: &BookRegistry) -> Result<()> {
    let selected = registry.select(&settings.api.books)?;
    let client = BibleApiClient::new(&settings.api)?;

    logger::info(&format!(
        "Fetching {} books from {}",
        selected.len(),
        settings.api.base_url
    ));

    let pb = books_progress_bar(selected.len())?;
    let stats = generate_site_from_api(&client, &selected, settings, |book| {
        pb.set_message(book.name.clone());
        pb.inc(1);
    })?;
    pb.finish_with_message("Done");

    print_stats(&stats, &settings.output_dir);
    Ok(())
}

fn extract(
    format: SourceFormat,
    path: &Path,
    out: Option<&Path>,
    settings: &SiteSettings,
) -> Result<()> {
    let data = match format {
        SourceFormat::Osis => try_parse_osis_file(path),
        SourceFormat::Zefania => {
            let options = ZefaniaParseOptions {
                number_failure_policy: settings.number_failure_policy,
            };
            try_parse_zefania_file(path, &options)
        }
    }
    .with_context(|| format!("Failed to extract {:?}", path))?;

    let json = serde_json::to_string_pretty(&data)?;

    match out {
        Some(p) => {
            fs::write(p, json).with_context(|| format!("Failed to write {:?}", p))?;
            logger::info(&format!(
                "Wrote {} books ({} verses) to {:?}",
                data.book_count(),
                data.verse_count(),
                p
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn main() {
    // The .env file may set LITURGY_BIBLE_* variables, which clap picks up via `env = ...`.
    if dotenv().is_err() {
        println!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    let mut settings = match load_settings(cli.settings.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    };

    let registry = match load_registry(cli.registry.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    };

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::Generate { osis, zefania, output_dir, default_translation, number_failure_policy, only_missing } => {
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            if let Some(label) = default_translation {
                settings.default_translation = Some(label);
            }
            if let Some(policy) = number_failure_policy {
                settings.number_failure_policy = policy.into();
            }
            settings.only_missing |= only_missing;

            generate(&settings, &registry, osis.as_deref(), zefania.as_deref())
        }

        Commands::Fetch { books, output_dir, only_missing, api_url, delay_ms } => {
            if let Some(books) = books {
                settings.api.books = books.iter().map(|b| b.trim().to_string()).collect();
            }
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            if let Some(url) = api_url {
                settings.api.base_url = url;
            }
            if let Some(ms) = delay_ms {
                settings.api.delay_ms = ms;
            }
            settings.only_missing |= only_missing;

            fetch(&settings, &registry)
        }

        Commands::Extract { format, path, out, number_failure_policy } => {
            if let Some(policy) = number_failure_policy {
                settings.number_failure_policy = policy.into();
            }
            extract(format, &path, out.as_deref(), &settings)
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
