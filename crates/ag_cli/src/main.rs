use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ag_core::config::{
    BackendSettings, LoopSettings, ScrapeSettings, MAX_QUALITY_ITERATIONS, MAX_URLS,
    MODEL_TIMEOUT_SECS, OPENAI_BASE_URL, OPENAI_MODEL, QUALITY_THRESHOLD, REQUEST_TIMEOUT_SECS,
    TOGETHER_BASE_URL, TOGETHER_MODEL, USER_AGENT,
};
use ag_core::logging::init_tracing;
use ag_core::{Error, ModelKind, Outcome, QualityStamp, Result, Settings};
use ag_inference::ocr::ChatTextRecognizer;
use ag_inference::GenerateOptions;
use ag_scrapers::{handle_pdf, handle_scrape, ArticleRequest, PdfArgs, PdfTextExtractor, ScrapeArgs};
use ag_web::AppState;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

/// Overall generation budget such as `90`, `45s`, `5m` or `1h30m`. A bare
/// number is seconds.
impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let overflow = || format!("Duration too large: {}", s);
        let mut seconds = 0u64;
        let mut pending: Option<u64> = None;

        for c in s.trim().chars() {
            if let Some(digit) = c.to_digit(10) {
                let value = pending
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit)))
                    .ok_or_else(overflow)?;
                pending = Some(value);
                continue;
            }
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                _ => return Err(format!("Invalid duration unit '{}' in {}", c, s)),
            };
            let value = pending.take().ok_or_else(|| format!("Unit '{}' has no number in {}", c, s))?;
            seconds = value
                .checked_mul(unit)
                .and_then(|v| seconds.checked_add(v))
                .ok_or_else(overflow)?;
        }

        match pending {
            Some(value) => seconds = seconds.checked_add(value).ok_or_else(overflow)?,
            None if s.trim().is_empty() => return Err("Duration must include a number".to_string()),
            None => {}
        }
        Ok(HumanDuration(Duration::from_secs(seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Quality-controlled business article generator", long_about = None)]
struct Cli {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_BASE_URL)]
    openai_base_url: String,
    #[arg(long, env = "OPENAI_MODEL", default_value = OPENAI_MODEL)]
    openai_model: String,
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
    together_api_key: Option<String>,
    #[arg(long, env = "TOGETHER_BASE_URL", default_value = TOGETHER_BASE_URL)]
    together_base_url: String,
    #[arg(long, env = "TOGETHER_MODEL", default_value = TOGETHER_MODEL)]
    together_model: String,
    /// Backend used when a request does not name one
    #[arg(long, env = "DEFAULT_MODEL", default_value = "openai")]
    default_model: ModelKind,
    #[arg(long, env = "QUALITY_THRESHOLD", default_value_t = QUALITY_THRESHOLD)]
    quality_threshold: f64,
    #[arg(long, env = "MAX_QUALITY_ITERATIONS", default_value_t = MAX_QUALITY_ITERATIONS)]
    max_iterations: u32,
    /// Overall budget for one generation loop (e.g. 90s, 5m, 1m30s)
    #[arg(long, env = "GENERATION_DEADLINE")]
    deadline: Option<HumanDuration>,
    /// Scraping timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,
    /// Model call timeout in seconds
    #[arg(long, env = "MODEL_TIMEOUT", default_value_t = MODEL_TIMEOUT_SECS)]
    model_timeout: u64,
    #[arg(long, env = "MAX_URLS", default_value_t = MAX_URLS)]
    max_urls: usize,
    /// Use the dummy model and scorer, no API keys needed
    #[arg(long)]
    offline: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "BIND", default_value = "0.0.0.0:8000")]
        bind: String,
        #[arg(
            long,
            env = "CORS_ORIGINS",
            value_delimiter = ',',
            default_value = "http://localhost:3000,http://127.0.0.1:3000"
        )]
        cors_origins: Vec<String>,
    },
    /// Generate one article and write it to disk
    Generate(GenerateArgs),
    /// Fetch pages and print their cleaned text
    Scrape(ScrapeArgs),
    /// Print the text of a PDF file
    Pdf(PdfArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long)]
    topic: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    audience: Option<String>,
    /// Comma separated SEO keywords
    #[arg(long)]
    keywords: Option<String>,
    /// Reference page, repeatable
    #[arg(long = "url")]
    urls: Vec<String>,
    /// Reference PDF
    #[arg(long)]
    pdf: Option<PathBuf>,
    /// Extra instructions for the writer
    #[arg(long)]
    prompt: Option<String>,
    /// Backend for this article (openai, together, dummy)
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    analyze: bool,
    /// Also write a Thai translation next to the output
    #[arg(long)]
    thai: bool,
    #[arg(long, short, default_value = "article.md")]
    output: PathBuf,
    /// Also render a print-ready HTML document
    #[arg(long)]
    html: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            openai: BackendSettings {
                base_url: self.openai_base_url.clone(),
                api_key: self.openai_api_key.clone(),
                model: self.openai_model.clone(),
                ..BackendSettings::openai()
            },
            together: BackendSettings {
                base_url: self.together_base_url.clone(),
                api_key: self.together_api_key.clone(),
                model: self.together_model.clone(),
                ..BackendSettings::together()
            },
            default_model: if self.offline {
                ModelKind::Dummy
            } else {
                self.default_model
            },
            model_timeout: Duration::from_secs(self.model_timeout),
            generation: LoopSettings {
                quality_threshold: self.quality_threshold,
                max_iterations: self.max_iterations,
                deadline: self.deadline.map(|d| d.0),
            },
            scrape: ScrapeSettings {
                request_timeout: Duration::from_secs(self.request_timeout),
                user_agent: USER_AGENT.to_string(),
                max_urls: self.max_urls,
            },
            ..defaults
        }
    }

    fn app_state(&self, settings: &Settings) -> Result<AppState> {
        if self.offline {
            info!("🧪 Offline mode: dummy model and scorer");
            AppState::offline(settings)
        } else {
            AppState::from_settings(settings)
        }
    }
}

impl GenerateArgs {
    async fn request(&self) -> Result<ArticleRequest> {
        let pdf_base64 = match &self.pdf {
            Some(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| Error::Pdf(format!("Cannot read {}: {}", path.display(), e)))?;
                Some(STANDARD.encode(bytes))
            }
            None => None,
        };
        Ok(ArticleRequest {
            topic_category: self.topic.clone(),
            industry: self.industry.clone(),
            target_audience: self.audience.clone(),
            source_urls: self.urls.clone(),
            pdf_base64,
            seo_keywords: self.keywords.clone(),
            custom_prompt: self.prompt.clone(),
            selected_model: self.model.clone(),
            include_analysis: self.analyze,
            translate_to_thai: self.thai,
            ..ArticleRequest::default()
        })
    }
}

/// `article.md` -> `article_th.md`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("article");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("md");
    path.with_file_name(format!("{}_{}.{}", stem, suffix, extension))
}

async fn generate(args: &GenerateArgs, state: AppState) -> Result<()> {
    let request = args.request().await?;
    let context = state.context.build(&request).await?;
    let options = GenerateOptions {
        model: request.model_kind()?,
        analyze: args.analyze,
        translate: args.thai,
    };

    let output = state.service.generate(&context, options).await?;
    let result = &output.result;
    tokio::fs::write(&args.output, &result.draft.content).await?;
    info!(
        "📝 Wrote {} (score {:.2}, {} iteration(s), {})",
        args.output.display(),
        result.quality.score,
        result.iterations,
        if result.accepted { "accepted" } else { "below threshold" }
    );

    if let Some(analysis) = &output.analysis {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    }

    match &output.translation {
        Some(Outcome::Complete(translation)) => {
            let path = sibling_path(&args.output, "th");
            tokio::fs::write(&path, &translation.content).await?;
            info!("🌏 Wrote {}", path.display());
        }
        Some(Outcome::Degraded(reason)) => warn!("Thai translation skipped: {}", reason),
        None => {}
    }

    if let Some(html_path) = &args.html {
        let stamp = QualityStamp {
            quality_score: result.quality.score,
            iterations: result.iterations,
        };
        let encoded = state.service.render(&result.draft.content, Some(stamp)).await?;
        let html = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Rendering(format!("Invalid document encoding: {}", e)))?;
        tokio::fs::write(html_path, html).await?;
        info!("📄 Wrote {}", html_path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("info");
    let cli = Cli::parse();
    let settings = cli.settings();
    settings.validate()?;

    match cli.command {
        Commands::Serve {
            ref bind,
            ref cors_origins,
        } => {
            let state = cli.app_state(&settings)?;
            info!("🧠 Models ready: default {}", state.service.models().default_kind());
            ag_web::serve(state, bind, cors_origins).await?;
        }
        Commands::Generate(ref args) => {
            let state = cli.app_state(&settings)?;
            generate(args, state).await?;
        }
        Commands::Scrape(args) => handle_scrape(args, &settings.scrape).await?,
        Commands::Pdf(args) => {
            let extractor = if cli.offline {
                PdfTextExtractor::new()
            } else {
                match ChatTextRecognizer::new(&settings.openai, settings.model_timeout) {
                    Ok(recognizer) => PdfTextExtractor::with_recognizer(Arc::new(recognizer)),
                    Err(e) => {
                        warn!("OCR fallback unavailable: {}", e);
                        PdfTextExtractor::new()
                    }
                }
            };
            handle_pdf(args, &extractor).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("1m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("2h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(7200));
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        let huge = format!("{}h", u64::MAX / 1000);
        let err = huge.parse::<HumanDuration>().unwrap_err();
        assert!(err.contains("too large"), "{}", err);
        assert!("99999999999999999999999".parse::<HumanDuration>().is_err());
        assert!(format!("{}s1s", u64::MAX).parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_generate_args_and_settings() {
        let cli = Cli::try_parse_from([
            "ag",
            "--offline",
            "--max-iterations",
            "2",
            "--deadline",
            "5m",
            "generate",
            "--topic",
            "Retail AI",
            "--url",
            "https://a.example.com",
            "--url",
            "https://b.example.com",
            "--thai",
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.default_model, ModelKind::Dummy);
        assert_eq!(settings.generation.max_iterations, 2);
        assert_eq!(settings.generation.deadline, Some(Duration::from_secs(300)));
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.urls.len(), 2);
                assert!(args.thai);
                assert_eq!(args.output, PathBuf::from("article.md"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_default_model_is_rejected() {
        assert!(Cli::try_parse_from(["ag", "--default-model", "llama", "serve"]).is_err());
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(sibling_path(Path::new("out/a.md"), "th"), PathBuf::from("out/a_th.md"));
        assert_eq!(sibling_path(Path::new("a"), "th"), PathBuf::from("a_th.md"));
    }
}
