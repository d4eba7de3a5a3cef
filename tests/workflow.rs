use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use cutsub::config::Config;
use cutsub::error::{CutsubError, Result};
use cutsub::prompt::CannedPrompt;
use cutsub::runner::{CommandRunner, ToolCommand};
use cutsub::subtitle::SubtitleMode;
use cutsub::workflow::{RunOptions, Workflow};

/// Stands in for auto-editor, whisper and ffmpeg by writing the files they would produce
#[derive(Default)]
struct FakeTools {
    commands: Mutex<Vec<ToolCommand>>,
    fail_program: Option<String>,
}

impl FakeTools {
    fn failing(program: &str) -> Self {
        Self {
            fail_program: Some(program.to_string()),
            ..Self::default()
        }
    }

    fn commands(&self) -> Vec<ToolCommand> {
        self.commands.lock().unwrap().clone()
    }

    fn programs(&self) -> Vec<String> {
        self.commands().into_iter().map(|cmd| cmd.program).collect()
    }
}

fn arg_after<'a>(cmd: &'a ToolCommand, flag: &str) -> &'a str {
    let index = cmd.args.iter().position(|arg| arg == flag).unwrap();
    &cmd.args[index + 1]
}

#[async_trait]
impl CommandRunner for FakeTools {
    async fn run(&self, command: &ToolCommand) -> Result<String> {
        self.commands.lock().unwrap().push(command.clone());

        if self.fail_program.as_deref() == Some(command.program.as_str()) {
            return Err(CutsubError::Process {
                program: command.program.clone(),
                status: "exit status: 1".to_string(),
                stderr: "no such filter".to_string(),
            });
        }

        match command.program.as_str() {
            "auto-editor" => {
                let source = fs::read(&command.args[0]).unwrap();
                let mut trimmed = b"trimmed:".to_vec();
                trimmed.extend(source);
                fs::write(arg_after(command, "--export"), trimmed).unwrap();
            }
            "whisper" => {
                let input = Path::new(&command.args[0]);
                let stem = input.file_stem().unwrap().to_string_lossy();
                let out_dir = Path::new(arg_after(command, "--output_dir"));
                fs::write(out_dir.join(format!("{}.srt", stem)), "1\n00:00:00,000 --> 00:00:01,000\nhello\n").unwrap();
            }
            "ffmpeg" => {
                fs::write(command.args.last().unwrap(), b"final").unwrap();
            }
            other => panic!("unexpected program {other}"),
        }
        Ok(String::new())
    }
}

struct Fixture {
    temp: TempDir,
    config: Config,
    input: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("raw_videos");
        fs::create_dir_all(&input).unwrap();

        let mut config = Config::default();
        config.paths.working_dir = temp.path().join("output");
        config.paths.archive_dir = temp.path().join("archive");

        Self { temp, config, input }
    }

    fn add_video(&self, name: &str, content: &str) {
        fs::write(self.input.join(name), content).unwrap();
        // Birth times come from a coarse clock.
        sleep(Duration::from_millis(50));
    }

    fn output(&self, name: &str) -> PathBuf {
        self.temp.path().join("output").join(name)
    }

    fn snapshots(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(self.temp.path().join("archive"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        dirs.sort();
        dirs
    }

    async fn run(&self, tools: Arc<FakeTools>, answers: &[&str]) -> Result<cutsub::workflow::RunReport> {
        let mut workflow = Workflow::new(
            self.config.clone(),
            tools,
            Box::new(CannedPrompt::new(answers.iter().copied())),
        );
        workflow.run(RunOptions::default()).await
    }
}

#[tokio::test]
async fn picks_the_newest_video() {
    let fixture = Fixture::new();
    fixture.add_video("clip1.mp4", "older");
    fixture.add_video("clip2.mp4", "newer");

    let tools = Arc::new(FakeTools::default());
    let input = fixture.input.to_string_lossy().into_owned();
    let report = fixture.run(tools.clone(), &[&input, "1"]).await.unwrap();

    assert_eq!(report.source_video, fixture.input.join("clip2.mp4"));
    assert_eq!(tools.commands()[0].args[0], fixture.input.join("clip2.mp4").to_string_lossy());
    assert_eq!(fs::read(fixture.output("trimmed.mp4")).unwrap(), b"trimmed:newer");
}

#[tokio::test]
async fn soft_mode_produces_tagged_track() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");

    let tools = Arc::new(FakeTools::default());
    let input = fixture.input.to_string_lossy().into_owned();
    let report = fixture.run(tools.clone(), &[&input, "2"]).await.unwrap();

    assert_eq!(report.mode, SubtitleMode::Soft);
    assert_eq!(report.final_video, fixture.output("trimmed_soft.mp4"));
    assert_eq!(report.subtitle_file, fixture.output("trimmed.srt"));
    assert!(report.final_video.is_file());

    assert_eq!(tools.programs(), ["auto-editor", "whisper", "ffmpeg"]);
    let mux = &tools.commands()[2];
    assert_eq!(arg_after(mux, "-c"), "copy");
    assert_eq!(arg_after(mux, "-c:s"), "mov_text");
    assert_eq!(arg_after(mux, "-metadata:s:s:0"), "language=chi");
    assert_eq!(mux.args.iter().filter(|arg| *arg == "-i").count(), 2);
    assert!(!mux.args.contains(&"-vf".to_string()));
}

#[tokio::test]
async fn default_answer_burns_in() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");

    let tools = Arc::new(FakeTools::default());
    let input = fixture.input.to_string_lossy().into_owned();
    let report = fixture.run(tools.clone(), &[&input, ""]).await.unwrap();

    assert_eq!(report.mode, SubtitleMode::BurnIn);
    assert_eq!(report.final_video, fixture.output("trimmed_burn-in.mp4"));
    let mux = &tools.commands()[2];
    assert!(arg_after(mux, "-vf").starts_with("subtitles="));
    assert_eq!(arg_after(mux, "-c:a"), "copy");
}

#[tokio::test]
async fn transcription_uses_fixed_parameters() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");

    let tools = Arc::new(FakeTools::default());
    let input = fixture.input.to_string_lossy().into_owned();
    fixture.run(tools.clone(), &[&input]).await.unwrap();

    let whisper = &tools.commands()[1];
    assert_eq!(whisper.args[0], fixture.output("trimmed.mp4").to_string_lossy());
    assert_eq!(arg_after(whisper, "--model"), "medium");
    assert_eq!(arg_after(whisper, "--language"), "Chinese");
    assert_eq!(arg_after(whisper, "--task"), "translate");
    assert_eq!(arg_after(whisper, "--temperature"), "0");
    assert_eq!(arg_after(whisper, "--output_format"), "srt");
}

#[tokio::test]
async fn failing_tool_stops_later_stages() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");

    let tools = Arc::new(FakeTools::failing("whisper"));
    let input = fixture.input.to_string_lossy().into_owned();
    let err = fixture.run(tools.clone(), &[&input, "2"]).await.unwrap_err();

    assert!(matches!(err, CutsubError::Process { .. }));
    assert!(err.to_string().contains("no such filter"));
    assert_eq!(tools.programs(), ["auto-editor", "whisper"]);
    // Partial artifacts are left in place.
    assert!(fixture.output("trimmed.mp4").is_file());
}

#[tokio::test]
async fn second_run_archives_first_run_artifacts() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");
    let input = fixture.input.to_string_lossy().into_owned();

    let first = fixture.run(Arc::new(FakeTools::default()), &[&input, "2"]).await.unwrap();
    let first_trimmed = fs::read(&first.trimmed_video).unwrap();
    let first_subtitles = fs::read(&first.subtitle_file).unwrap();
    let first_final = fs::read(&first.final_video).unwrap();

    // Only fails after archival so the snapshot reflects the state before any new write.
    let second = fixture
        .run(Arc::new(FakeTools::failing("auto-editor")), &[&input])
        .await;
    assert!(second.is_err());

    let snapshots = fixture.snapshots();
    assert_eq!(snapshots.len(), 2);
    let archived: Vec<_> = snapshots
        .iter()
        .filter(|dir| dir.join("trimmed_soft.mp4").exists())
        .collect();
    assert_eq!(archived.len(), 1);
    let snapshot = archived[0];
    assert!(snapshot.file_name().unwrap().to_string_lossy().starts_with("backup_"));
    assert_eq!(fs::read(snapshot.join("trimmed.mp4")).unwrap(), first_trimmed);
    assert_eq!(fs::read(snapshot.join("trimmed.srt")).unwrap(), first_subtitles);
    assert_eq!(fs::read(snapshot.join("trimmed_soft.mp4")).unwrap(), first_final);
    assert_eq!(fs::read_dir(fixture.temp.path().join("output")).unwrap().count(), 0);
}

#[tokio::test]
async fn options_skip_the_prompts() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");

    let mut workflow = Workflow::new(
        fixture.config.clone(),
        Arc::new(FakeTools::default()),
        Box::new(CannedPrompt::default()),
    );
    let report = workflow
        .run(RunOptions {
            input_dir: Some(fixture.input.clone()),
            mode: Some(SubtitleMode::Soft),
        })
        .await
        .unwrap();

    assert_eq!(report.final_video, fixture.output("trimmed_soft.mp4"));
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn final_path_is_reported_once_by_the_caller() {
    let fixture = Fixture::new();
    fixture.add_video("clip.mp4", "source");
    let input = fixture.input.to_string_lossy().into_owned();

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let report = fixture.run(Arc::new(FakeTools::default()), &[&input, "2"]).await.unwrap();

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("Stage 5/5 merge subtitles"));
    assert!(!text.contains("Output file"));
    assert!(report.final_video.is_file());
}
