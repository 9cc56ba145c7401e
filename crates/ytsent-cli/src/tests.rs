use super::*;

#[test]
fn parses_analyze_command() {
    let cli = Cli::try_parse_from([
        "ytsent",
        "analyze",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze { ref page_url } if page_url == "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    ));
}

#[test]
fn parses_submit_command() {
    let cli =
        Cli::try_parse_from(["ytsent", "submit", "dQw4w9WgXcQ"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Submit { ref video_id } if video_id == "dQw4w9WgXcQ"
    ));
}

#[test]
fn status_defaults_to_single_read() {
    let cli = Cli::try_parse_from(["ytsent", "status", "job-1"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Status { ref job_id, watch: false } if job_id == "job-1"
    ));
}

#[test]
fn status_watch_flag() {
    let cli = Cli::try_parse_from(["ytsent", "status", "job-1", "--watch"])
        .expect("expected valid cli args");

    assert!(matches!(cli.command, Commands::Status { watch: true, .. }));
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["ytsent"]).is_err());
}

#[test]
fn analyze_requires_page_url() {
    assert!(Cli::try_parse_from(["ytsent", "analyze"]).is_err());
}
