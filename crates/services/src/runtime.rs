//! Drives a `FormController` on its own task: events arrive over a channel and timers
//! fire by sleeping until the next deadline.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::controller::{FormController, FormEvent, Outcome};
use crate::error::FormError;
use crate::history::NavigationHistory;
use crate::presentation::PresentationAdapter;

const EVENT_BUFFER: usize = 64;

struct Command {
    event: FormEvent,
    reply: Option<oneshot::Sender<Outcome>>,
}

/// Cloneable sender side of a running form.
///
/// When every handle is dropped the runtime saves the form as on page exit and stops.
#[derive(Clone)]
pub struct FormHandle {
    commands: mpsc::Sender<Command>,
}

impl FormHandle {
    /// Queue `event` without waiting for its outcome.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Stopped` if the runtime is gone.
    pub async fn send(&self, event: FormEvent) -> Result<(), FormError> {
        self.commands
            .send(Command { event, reply: None })
            .await
            .map_err(|_| FormError::Stopped)
    }

    /// Queue `event` from synchronous code, such as a UI callback.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Stopped` if the runtime is gone or its queue is full.
    pub fn try_send(&self, event: FormEvent) -> Result<(), FormError> {
        self.commands
            .try_send(Command { event, reply: None })
            .map_err(|_| FormError::Stopped)
    }

    /// Queue `event` and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Stopped` if the runtime is gone.
    pub async fn request(&self, event: FormEvent) -> Result<Outcome, FormError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| FormError::Stopped)?;
        outcome.await.map_err(|_| FormError::Stopped)
    }
}

pub struct FormRuntime;

impl FormRuntime {
    /// Spawn `controller` onto the current tokio runtime.
    ///
    /// The controller's clock starts at zero when this is called, so it should have
    /// been started with `now_ms = 0`. The task hands the controller back when it stops.
    pub fn spawn<P, H>(controller: FormController<P, H>) -> (FormHandle, JoinHandle<FormController<P, H>>)
    where
        P: PresentationAdapter + 'static,
        H: NavigationHistory + 'static,
    {
        let (commands, rx) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(run(controller, rx, Instant::now()));
        (FormHandle { commands }, task)
    }
}

async fn run<P, H>(
    mut controller: FormController<P, H>,
    mut rx: mpsc::Receiver<Command>,
    origin: Instant,
) -> FormController<P, H>
where
    P: PresentationAdapter,
    H: NavigationHistory,
{
    loop {
        let deadline = controller
            .next_deadline()
            .map(|ms| origin + Duration::from_millis(ms));

        tokio::select! {
            command = rx.recv() => {
                let Some(Command { event, reply }) = command else {
                    debug!("form handles dropped, saving on exit");
                    controller.dispatch(FormEvent::PageExit, elapsed_ms(origin)).await;
                    break;
                };
                let outcome = controller.dispatch(event, elapsed_ms(origin)).await;
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            () = wait_until(deadline) => {
                controller.advance_time(elapsed_ms(origin)).await;
            }
        }
    }
    controller
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn elapsed_ms(origin: Instant) -> u64 {
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}
