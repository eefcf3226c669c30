//! Story music generator. Renders the mood tracks (and any JSON recipes) to WAV.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use starfall_music::{Mood, Progression, SynthConfig, SynthError, TracingObserver, write_track};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: starfall-music [OUT_DIR] [--mood NAME]... [--recipe FILE.json]...
                      [--seconds N] [--sample-rate N] [--print-recipe NAME]

  OUT_DIR             destination directory (default: assets/audio)
  --mood NAME         render only this mood (epic, sad, triumph); repeatable
  --recipe FILE       render a JSON progression recipe; repeatable
  --seconds N         mood track length in seconds (default: 30)
  --sample-rate N     output sample rate in Hz (default: 44100)
  --print-recipe NAME print a mood's JSON recipe and exit";

/// One file to produce.
#[derive(Debug, Clone, PartialEq)]
enum Job {
    Mood(Mood),
    Recipe(PathBuf),
}

impl Job {
    fn label(&self) -> String {
        match self {
            Job::Mood(mood) => mood.name().to_string(),
            Job::Recipe(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Args {
    out_dir: PathBuf,
    jobs: Vec<Job>,
    config: SynthConfig,
    print_recipe: Option<Mood>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut out_dir = None;
    let mut jobs = Vec::new();
    let mut config = SynthConfig::default();
    let mut print_recipe = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--mood" => {
                let mood = value("--mood")?.parse::<Mood>().map_err(|e| e.to_string())?;
                jobs.push(Job::Mood(mood));
            }
            "--recipe" => jobs.push(Job::Recipe(PathBuf::from(value("--recipe")?))),
            "--seconds" => {
                let raw = value("--seconds")?;
                config.track_seconds = raw.parse().map_err(|_| format!("invalid --seconds '{raw}'"))?;
            }
            "--sample-rate" => {
                let raw = value("--sample-rate")?;
                config.sample_rate = raw.parse().map_err(|_| format!("invalid --sample-rate '{raw}'"))?;
            }
            "--print-recipe" => {
                let mood = value("--print-recipe")?.parse::<Mood>().map_err(|e| e.to_string())?;
                print_recipe = Some(mood);
            }
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            dir => {
                if out_dir.replace(PathBuf::from(dir)).is_some() {
                    return Err(format!("unexpected argument '{dir}'"));
                }
            }
        }
    }

    config.validate().map_err(|e| e.to_string())?;
    if jobs.is_empty() {
        jobs = Mood::ALL.into_iter().map(Job::Mood).collect();
    }

    Ok(Args {
        out_dir: out_dir.unwrap_or_else(|| PathBuf::from("assets/audio")),
        jobs,
        config,
        print_recipe,
    })
}

/// File-system safe stem for a recipe name.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "recipe".to_string() } else { stem }
}

fn run_job(job: &Job, out_dir: &Path, config: &SynthConfig) -> Result<PathBuf, SynthError> {
    let (progression, path) = match job {
        Job::Mood(mood) => (mood.progression(config.track_seconds)?, out_dir.join(mood.file_name())),
        Job::Recipe(recipe) => {
            let progression = Progression::from_json(&std::fs::read_to_string(recipe)?)?;
            let path = out_dir.join(format!("{}.wav", file_stem(progression.name())));
            (progression, path)
        }
    };
    write_track(&path, &progression, config, &TracingObserver)?;
    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) if msg.is_empty() => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Some(mood) = args.print_recipe {
        return match mood
            .progression(args.config.track_seconds)
            .and_then(|p| p.to_json_pretty())
        {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    println!("=== Story Music Generator ===");
    println!("Generating {} second tracks...", args.config.track_seconds);

    if let Err(e) = tokio::fs::create_dir_all(&args.out_dir).await {
        eprintln!("error: cannot create {}: {e}", args.out_dir.display());
        return ExitCode::FAILURE;
    }

    // Tracks share nothing, so each renders on its own blocking thread.
    let mut tasks = JoinSet::new();
    for (index, job) in args.jobs.iter().cloned().enumerate() {
        let out_dir = args.out_dir.clone();
        let config = args.config;
        tasks.spawn_blocking(move || {
            let result = run_job(&job, &out_dir, &config);
            (index, job, result)
        });
    }

    let mut created = Vec::new();
    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, job, Ok(path))) => {
                println!("Created: {}", path.display());
                created.push((index, job, path));
            }
            Ok((_, job, Err(e))) => {
                tracing::error!("Failed to render {}: {e}", job.label());
                failed += 1;
            }
            Err(e) => {
                tracing::error!("Render task panicked: {e}");
                failed += 1;
            }
        }
    }
    created.sort_by_key(|(index, _, _)| *index);

    if failed > 0 {
        eprintln!("\n=== {failed} track(s) failed, {} created ===", created.len());
        return ExitCode::FAILURE;
    }

    println!("\n=== All story music generated! ===");
    println!("Files created in {}/:", args.out_dir.display());
    for (_, job, path) in &created {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        match job {
            Job::Mood(mood) => println!("  - {name} ({})", mood.usage()),
            Job::Recipe(_) => println!("  - {name}"),
        }
    }
    ExitCode::SUCCESS
}
