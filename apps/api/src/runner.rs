//! Dedicated-thread runner for models that are not `Sync` (rust-bert pipelines).
#![cfg_attr(not(feature = "bert"), allow(dead_code))]

use std::thread;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::errors::AppError;

type RunnerMessage<Req, Resp> = (Req, oneshot::Sender<Resp>);

/// Owns a model on its own OS thread and serves requests over a channel.
///
/// `spawn` resolves only after the model has loaded, so a missing or broken model
/// surfaces at startup instead of on the first request.
pub struct ModelRunner<Req, Resp> {
    label: &'static str,
    sender_to_runner: mpsc::Sender<RunnerMessage<Req, Resp>>,
}

impl<Req, Resp> ModelRunner<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub async fn spawn<M, L, H>(label: &'static str, load: L, handle: H) -> anyhow::Result<Self>
    where
        L: FnOnce() -> anyhow::Result<M> + Send + 'static,
        H: Fn(&M, Req) -> Resp + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<RunnerMessage<Req, Resp>>(32);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();

        thread::spawn(move || {
            let model = match load() {
                Ok(model) => model,
                Err(e) => {
                    error!("{label} failed to load: {e:#}");
                    let _ = ready_tx.send(Err(format!("{e:#}")));
                    return;
                }
            };
            info!("{label} loaded");
            let _ = ready_tx.send(Ok(()));

            while let Some((request, reply)) = receiver.blocking_recv() {
                // The requester may have gone away; nothing to do then.
                let _ = reply.send(handle(&model, request));
            }
        });

        ready_rx
            .await
            .map_err(|_| anyhow!("{label} runner exited before loading"))?
            .map_err(|e| anyhow!("{label} failed to load: {e}"))?;

        Ok(Self {
            label,
            sender_to_runner: sender,
        })
    }

    pub async fn call(&self, request: Req) -> Result<Resp, AppError> {
        let (reply, receiver) = oneshot::channel();
        self.sender_to_runner
            .send((request, reply))
            .await
            .map_err(|_| AppError::Internal(anyhow!("{} runner is not running", self.label)))?;

        receiver
            .await
            .map_err(|_| AppError::Internal(anyhow!("{} runner dropped the request", self.label)))
    }
}
