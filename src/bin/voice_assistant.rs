//! voice-assistant: 语音/图像问诊助手命令行工具
//!
//! Usage:
//!   voice-assistant ask [--audio <file>] [--image <file>]   Ask a question, hear the answer
//!   voice-assistant say <text>                               Speak text through the TTS path

use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voice_assistant::{Assistant, AssistantConfig, AssistantInputs};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "ask" => cmd_ask(&args[2..]),
        "say" => cmd_say(&args[2..]),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"voice-assistant: 语音/图像问诊助手

USAGE:
    voice-assistant <COMMAND> [OPTIONS]

COMMANDS:
    ask [--audio <file>] [--image <file>]   Transcribe, analyze, speak the answer
    say <text>                              Synthesize and play <text>
    version                                 Show version information
    help                                    Show this help message

OPTIONS:
    --out <file>        Where to write the spoken answer (default: final.mp3)
    --config <file>     YAML configuration file
    --no-play           Write the audio file but do not play it

ENVIRONMENT:
    GROQ_API_KEY                        Transcription and vision model key
    ELEVENLABS_API_KEY / ELEVEN_API_KEY Speech key (gTTS is used without one)
    ELEVEN_VOICE_ID                     Voice to speak with
    AI_HTTP_TIMEOUT_SECS                HTTP timeout
    VOICE_ASSISTANT_OUTPUT              Default output file
    RUST_LOG                            Log filter (default: info)"#
    );
}

fn cmd_version() {
    println!("voice-assistant {}", env!("CARGO_PKG_VERSION"));
}

#[derive(Debug, Default)]
struct Options {
    audio: Option<PathBuf>,
    image: Option<PathBuf>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    no_play: bool,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .with_context(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--audio" => opts.audio = Some(value("--audio")?),
            "--image" => opts.image = Some(value("--image")?),
            "--out" => opts.out = Some(value("--out")?),
            "--config" => opts.config = Some(value("--config")?),
            "--no-play" => opts.no_play = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            _ => opts.positional.push(arg.clone()),
        }
    }
    Ok(opts)
}

fn load_config(opts: &Options) -> anyhow::Result<AssistantConfig> {
    let mut config = match &opts.config {
        Some(path) => AssistantConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_env_overrides(),
        None => AssistantConfig::from_env(),
    };
    if let Some(out) = &opts.out {
        config.output_path = out.clone();
    }
    if opts.no_play {
        config.autoplay = false;
    }
    Ok(config)
}

fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let config = load_config(&opts)?;
    let assistant = Assistant::from_config(&config)?;

    let reply = assistant.process(&AssistantInputs {
        audio: opts.audio,
        image: opts.image,
    });

    if !reply.transcript.is_empty() {
        println!("You said: {}", reply.transcript);
    }
    println!("Doctor: {}", reply.answer);
    match reply.audio {
        Some(file) => println!("Audio: {} ({} bytes)", file.path.display(), file.bytes_written),
        None => println!("Audio: none"),
    }
    Ok(())
}

fn cmd_say(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    if opts.positional.is_empty() {
        bail!("say requires the text to speak");
    }
    let text = opts.positional.join(" ");
    let config = load_config(&opts)?;
    let assistant = Assistant::from_config(&config)?;
    let file = assistant.speak(&text, &config.output_path)?;
    println!("Audio: {} ({} bytes)", file.path.display(), file.bytes_written);
    Ok(())
}
