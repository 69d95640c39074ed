use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use typist::clipboard::SystemClipboard;
use typist::keyboard::find_first_untypable_char;
use typist::listen::run_activation_loop;
use typist::mistakes::AdjacentKeyErrors;
use typist::playback::{
    countdown, install_stop_handler, open_hotkey, open_keyboard, play_plan, resolve_backend,
};
use typist::profile::{self, TypingProfile};
use typist::sequencer::{run_session, SessionOutcome};
use typist::sim;
use typist::sink::PlanRecorder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Auto,
    X11,
}

impl BackendArg {
    fn to_library(self) -> typist::playback::PlaybackBackend {
        match self {
            BackendArg::Auto => typist::playback::PlaybackBackend::Auto,
            BackendArg::X11 => typist::playback::PlaybackBackend::X11,
        }
    }
}

#[derive(Debug, Args, Clone)]
struct ProfileArgs {
    /// Typing profile: slow, normal, fast or careful.
    #[arg(long, default_value = profile::DEFAULT_PROFILE)]
    profile: String,

    /// Multiplier applied to the profile's pauses (larger = slower).
    ///
    /// Values <= 0 keep the profile's speed.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    speed: f64,

    /// Per-letter error rate (0.0-0.3), replacing the profile's.
    ///
    /// Values above 0.3 are clamped. Negative keeps the profile's rate.
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    errors: f64,

    /// Type straight through without misclicks.
    #[arg(long)]
    no_mistakes: bool,

    /// Optional RNG seed (for debugging)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Parser)]
#[command(name = "typist")]
#[command(about = "Types text like a person: uneven timing, occasional fixed typos", long_about = None)]
struct Cli {
    /// Log debug detail (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wait for Shift+Space and type the clipboard into the focused window
    Listen {
        /// Keyboard backend.
        ///
        /// - auto: choose a backend based on the runtime environment
        /// - x11: force X11 (XTEST)
        #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
        backend: BackendArg,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Type a file (or stdin) once into the focused window
    Type {
        /// Input text file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Countdown seconds before typing starts
        #[arg(long, default_value_t = 3)]
        countdown: u64,

        /// Keyboard backend.
        #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
        backend: BackendArg,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Record a typing session as a plan (JSON) without typing it
    Plan {
        /// Input text file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Output plan file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Play a recorded plan into the focused window
    Play {
        /// Plan file (JSON)
        #[arg(long, value_name = "PATH")]
        plan: PathBuf,

        /// Countdown seconds before playback starts
        #[arg(long, default_value_t = 3)]
        countdown: u64,

        /// Keyboard backend.
        #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
        backend: BackendArg,

        /// Disable console typing trace output
        #[arg(long)]
        no_trace: bool,
    },

    /// List the built-in typing profiles
    Profiles,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: &PathBuf, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn resolve_profile(args: &ProfileArgs) -> Result<TypingProfile> {
    let mut resolved = profile::resolve(&args.profile, args.speed, args.errors)?;
    if args.no_mistakes {
        resolved = resolved.with_mistakes(false);
    }

    info!(
        "Profile: {} | speed={:.2} | errors={:.3} | mistakes={}",
        resolved.name,
        resolved.speed_multiplier,
        resolved.error_rate,
        if resolved.mistakes_enabled { "on" } else { "off" }
    );
    Ok(resolved)
}

fn warn_if_untypable(text: &str) {
    if let Some((idx, c)) = find_first_untypable_char(text) {
        warn!("character {c:?} at byte {idx} has no X11 keysym; typing it will fail");
    }
}

fn report_session(outcome: SessionOutcome) {
    match outcome {
        SessionOutcome::Skipped => eprintln!("Nothing to type."),
        SessionOutcome::Typed(stats) => eprintln!(
            "Typed {} chars with {} fixed mistakes in ~{:.1}s",
            stats.typed,
            stats.mistakes,
            stats.total_pause.as_secs_f64()
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Listen { backend, profile } => {
            let resolved = resolve_profile(&profile)?;
            // Fail fast on unsupported environments/backends.
            resolve_backend(backend.to_library())?;

            let stop = install_stop_handler()?;
            let mut keyboard = open_keyboard(backend.to_library())?;
            let mut clipboard = SystemClipboard::new()?;
            let mut trigger = open_hotkey(backend.to_library(), stop.clone())?;
            let mut rng = rng_from_seed(profile.seed);

            info!("Ready. Press Shift+Space to type clipboard content.");
            let summary = run_activation_loop(
                trigger.as_mut(),
                &mut clipboard,
                keyboard.as_mut(),
                &resolved,
                &AdjacentKeyErrors,
                &mut rng,
            )?;
            info!(
                activations = summary.activations,
                typed = summary.typed,
                skipped = summary.skipped,
                failed = summary.failed,
                "stopped listening"
            );
        }
        Command::Type {
            input,
            countdown: countdown_secs,
            backend,
            profile,
        } => {
            let resolved = resolve_profile(&profile)?;
            resolve_backend(backend.to_library())?;

            let text = read_input(&input)?;
            warn_if_untypable(&text);

            let stop = install_stop_handler()?;
            let mut keyboard = open_keyboard(backend.to_library())?;
            if !countdown(stop.as_ref(), countdown_secs) {
                return Err(anyhow!("aborted"));
            }

            let mut rng = rng_from_seed(profile.seed);
            let outcome = run_session(
                &text,
                &resolved,
                &AdjacentKeyErrors,
                keyboard.as_mut(),
                &mut rng,
            )?;
            report_session(outcome);
        }
        Command::Plan {
            input,
            output,
            profile,
        } => {
            let resolved = resolve_profile(&profile)?;
            let text = read_input(&input)?;
            warn_if_untypable(&text);

            let mut rng = rng_from_seed(profile.seed);
            let mut recorder = PlanRecorder::new(&resolved);
            let outcome = run_session(
                &text,
                &resolved,
                &AdjacentKeyErrors,
                &mut recorder,
                &mut rng,
            )?;
            if outcome == SessionOutcome::Skipped {
                warn!("input is empty after trimming; the plan has no actions");
            }
            let plan = recorder.into_plan();

            let stats = sim::stats(&plan);
            eprintln!(
                "Planned: {} actions, {} keystrokes, {} erases, ~{:.1}s",
                stats.actions,
                stats.keystrokes,
                stats.erases,
                (stats.total_wait_ms as f64) / 1000.0
            );

            let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
            if let Some(out) = output {
                write_output(&out, &json)?;
            } else {
                println!("{json}");
            }
        }
        Command::Play {
            plan,
            countdown,
            backend,
            no_trace,
        } => {
            // Fail fast on unsupported environments/backends.
            resolve_backend(backend.to_library())?;

            let json = fs::read_to_string(&plan)
                .with_context(|| format!("failed to read {}", plan.display()))?;
            let plan: typist::model::Plan =
                serde_json::from_str(&json).context("failed to parse plan JSON")?;

            let stats = sim::stats(&plan);
            eprintln!(
                "Playing: {} actions, {} keystrokes, {} erases, ~{:.1}s",
                stats.actions,
                stats.keystrokes,
                stats.erases,
                (stats.total_wait_ms as f64) / 1000.0
            );

            play_plan(&plan, countdown, !no_trace, backend.to_library())?;
        }
        Command::Profiles => {
            for p in profile::catalog() {
                println!(
                    "{:<8} speed={:.2} errors={:.3} mistakes={}",
                    p.name,
                    p.speed_multiplier,
                    p.error_rate,
                    if p.mistakes_enabled { "on" } else { "off" }
                );
            }
        }
    }

    Ok(())
}
