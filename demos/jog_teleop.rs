// Keyboard jog: Left/Right (or A/D) turn, S start, X stop, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::info;

use commutator_zenoh_runtime::config::{JOG_STEP_TURNS, TOPIC_JOG, TOPIC_LIFECYCLE};
use commutator_zenoh_runtime::messages::{JogCommand, LifecycleCommand};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let pub_jog = session.declare_publisher(TOPIC_JOG).await?;
    let pub_lifecycle = session.declare_publisher(TOPIC_LIFECYCLE).await?;

    info!("Controls: Left/A = +{JOG_STEP_TURNS} turn, Right/D = -{JOG_STEP_TURNS} turn, S=start, X=stop, Q=quit");

    enable_raw_mode()?;
    let result = run_jog(&pub_jog, &pub_lifecycle).await;
    disable_raw_mode()?;

    result
}

async fn run_jog(
    pub_jog: &zenoh::pubsub::Publisher<'_>,
    pub_lifecycle: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        // Held keys repeat, like the jog buttons on the original panel
        let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
        if !pressed {
            continue;
        }

        match code {
            KeyCode::Left | KeyCode::Char('a') => {
                send_jog(pub_jog, JOG_STEP_TURNS).await?;
            }
            KeyCode::Right | KeyCode::Char('d') => {
                send_jog(pub_jog, -JOG_STEP_TURNS).await?;
            }
            KeyCode::Char('s') => {
                info!("Start");
                pub_lifecycle
                    .put(serde_json::to_string(&LifecycleCommand::Start)?)
                    .await?;
            }
            KeyCode::Char('x') => {
                info!("Stop");
                pub_lifecycle
                    .put(serde_json::to_string(&LifecycleCommand::Stop)?)
                    .await?;
            }
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => {}
        }
    }

    Ok(())
}

async fn send_jog(
    publisher: &zenoh::pubsub::Publisher<'_>,
    turn: f64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Jog {:+.2} turn", turn);
    publisher.put(serde_json::to_string(&JogCommand { turn })?).await?;
    Ok(())
}
