//! Command handlers, called from `main` once config and logging are set up.

use anyhow::Context;
use ytsent_client::{
    AnalysisClient, ClientSettings, JobHandle, JobStatus, JobStatusRecord, PollEvent, PollSession,
    PollSettings, VideoId,
};
use ytsent_core::AppConfig;
use ytsent_relay::{Coordinator, PageContext, Panel, PanelState, Presenter, UrlPatternExtractor};

/// Prints every panel state on its own line.
#[derive(Debug, Default)]
pub(crate) struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn present(&mut self, state: &PanelState) {
        println!("{state}");
    }
}

fn build_client(config: &AppConfig) -> anyhow::Result<AnalysisClient> {
    AnalysisClient::new(&ClientSettings::from_app_config(config))
        .context("failed to build analysis client")
}

/// Runs the page, coordinator and panel together for `page_url`.
///
/// Ctrl-C closes the panel, which stops polling.
///
/// # Errors
///
/// Returns an error if any step of the flow fails; the failure has already
/// been printed as the final panel state.
pub(crate) async fn run_analyze(config: &AppConfig, page_url: &str) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let (page, _page_task) = PageContext::spawn(page_url, UrlPatternExtractor);
    let (coordinator, _coordinator_task) = Coordinator::spawn(client.clone());
    let mut panel = Panel::new(
        page,
        coordinator,
        client,
        PollSettings::from_app_config(config),
        TerminalPresenter,
    );

    tokio::select! {
        outcome = panel.analyze(page_url) => {
            let report = outcome?;
            tracing::info!(
                video_id = %report.video_id,
                job_id = %report.job,
                total = report.results.total,
                "analysis complete"
            );
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted, closing panel");
            anyhow::bail!("analysis interrupted")
        }
    }
}

/// Submits one job and prints its handle.
///
/// # Errors
///
/// Returns an error if the video id is blank or the service rejects the
/// submission.
pub(crate) async fn run_submit(config: &AppConfig, video_id: String) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let video_id = VideoId::new(video_id)?;
    let job = client
        .submit(&video_id)
        .await
        .with_context(|| format!("submission failed for video {video_id}"))?;
    println!("{job}");
    Ok(())
}

/// Reads one status, or with `watch` polls until the job ends.
///
/// # Errors
///
/// Returns an error if a status read fails, or if the watched job ends in
/// failure.
pub(crate) async fn run_status(
    config: &AppConfig,
    job_id: String,
    watch: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let job = JobHandle::new(job_id);

    if !watch {
        let record = client.job_status(&job).await?;
        println!("{}", describe(&record));
        return Ok(());
    }

    let (session, mut events) =
        PollSession::with_channel(client, job, PollSettings::from_app_config(config));
    while let Some(event) = events.recv().await {
        match event {
            PollEvent::Update(record) | PollEvent::Complete(record) => {
                println!("{}", describe(&record));
            }
            PollEvent::Failed(error) => {
                return Err(error).with_context(|| format!("job {} failed", session.job()));
            }
        }
    }
    Ok(())
}

fn describe(record: &JobStatusRecord) -> String {
    let state = match &record.status {
        JobStatus::Complete { results, warning } => PanelState::Complete {
            results: *results,
            warning: warning.clone(),
        },
        JobStatus::Error { .. } => {
            PanelState::Failed(record.status.error_message().unwrap_or_default())
        }
        progress => PanelState::from_progress(progress).unwrap_or(PanelState::Starting),
    };
    format!("[{}] {state}", record.status.tag())
}
