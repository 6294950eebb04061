//! Appointment DM console
//!
//! Runs the booking dialogue in a terminal: prompts are printed, answers are
//! typed, and an empty line stands for silence.

use appointment_dm::config::DialogueConfig;
use appointment_dm::lexicon::Lexicon;
use appointment_dm::runtime::{launch, RuntimeEvent};
use appointment_dm::speech::TerminalSpeech;
use appointment_dm::state_machine::{DialogueContext, DialogueState};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
    });
    let plain_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appointment_dm=info".into()),
        )
        .with(json_layer)
        .with(plain_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DialogueConfig::from_env()?;
    init_tracing(config.log_json);

    let lexicon = match &config.lexicon_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading lexicon");
            Lexicon::load(path)?
        }
        None => Lexicon::builtin(),
    };
    tracing::info!(entries = lexicon.len(), "Lexicon ready");

    let settings = config.speech.clone();
    let mut handle = launch(DialogueContext::new(lexicon), |events| {
        TerminalSpeech::stdio(settings, events)
    });

    let shutdown = handle.shutdown_token();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            on_ctrl_c.cancel();
        }
    });

    loop {
        let update = tokio::select! {
            () = shutdown.cancelled() => break,
            update = handle.updates.recv() => update,
        };

        match update {
            Ok(RuntimeEvent::StateChange {
                state: DialogueState::WaitToStart,
                ..
            }) => {
                println!("Press Enter to start.");
                let line = tokio::select! {
                    () = shutdown.cancelled() => break,
                    line = handle.speech.next_line() => line,
                };
                if line.is_none() {
                    tracing::info!("Input closed before the dialogue started");
                    break;
                }
                handle.click().await?;
            }
            Ok(RuntimeEvent::AppointmentCreated { appointment }) => {
                println!("{}", serde_json::to_string_pretty(&appointment)?);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Display fell behind the dialogue");
            }
            Err(RecvError::Closed) => break,
        }
    }

    handle.shutdown().await;
    Ok(())
}
