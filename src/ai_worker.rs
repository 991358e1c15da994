use crate::ai::{GenerativeService, QuizGenerator};
use crate::models::{QuizEvent, QuizJob};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Runs quiz jobs on a dedicated thread with its own tokio runtime, so the
/// UI loop never blocks on the service.
pub fn spawn_quiz_worker(
    service: Arc<dyn GenerativeService>,
    job_rx: Receiver<QuizJob>,
    event_tx: Sender<QuizEvent>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("visual-vocab::quiz_worker".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!("Failed to start quiz runtime: {}", e);
                    // Answer every job so the UI does not wait forever.
                    for QuizJob::Generate { request_id, .. } in job_rx.iter() {
                        let _ = event_tx.send(QuizEvent::Failed {
                            request_id,
                            error: format!("Failed to start background runtime: {}", e),
                        });
                    }
                    return;
                }
            };
            let generator = QuizGenerator::new(service);

            for job in job_rx.iter() {
                match job {
                    QuizJob::Generate {
                        request_id,
                        request,
                    } => {
                        tracing::info!("Worker received quiz request {}", request_id);
                        let event = match runtime.block_on(generator.generate_quiz(&request)) {
                            Ok(result) => QuizEvent::Ready { request_id, result },
                            Err(e) => {
                                tracing::warn!("Quiz request {} failed: {}", request_id, e);
                                QuizEvent::Failed {
                                    request_id,
                                    error: e.user_message(),
                                }
                            }
                        };
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Quiz worker channel disconnected, exiting");
        })
}
