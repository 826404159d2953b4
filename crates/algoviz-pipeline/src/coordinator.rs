//! Render pipeline coordinator.
//!
//! One call to [`RenderCoordinator::run`] is one job:
//!
//! 1. narration from the approach's source code
//! 2. animation script (mints the render id)
//! 3. `renders/<id>/animation.py`
//! 4. narration audio at `audio/<id>.mp3`
//! 5. render, then locate the produced video
//! 6. mux video and audio into `videos/<id>/<stem>_with_audio.mp4`
//!
//! Whatever happens, the work directory and the audio file are removed
//! before `run` returns. If the future is dropped mid-flight, running
//! children are killed and a scope guard removes the same files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use algoviz_llm::{NarrationGenerator, ScriptSynthesizer, TextGenerator};
use algoviz_media::fs_utils::{
    remove_dir_if_exists, remove_file_if_exists, remove_path_blocking, CleanupError,
};
use algoviz_media::{
    locate_artifact, AnimationRenderer, DirectoryReader, FfmpegMuxer, LocalFs, ManimRenderer,
    MediaError, Muxer, PythonSpeechSynthesizer, SpeechSynthesizer, VIDEO_EXTENSION,
};
use algoviz_models::{Approach, JobStage, RenderId};
use scopeguard::ScopeGuard;
use tracing::{debug, warn, Instrument};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::job::RenderJob;
use crate::layout::StorageLayout;
use crate::logging::JobLogger;
use crate::metrics;

/// The external stages a coordinator drives.
#[derive(Clone)]
pub struct RenderStages {
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub renderer: Arc<dyn AnimationRenderer>,
    pub muxer: Arc<dyn Muxer>,
    pub fs: Arc<dyn DirectoryReader>,
}

impl RenderStages {
    /// Python speech, Manim and FFmpeg on the local filesystem.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            speech: Arc::new(PythonSpeechSynthesizer::new(config.speech_config())),
            renderer: Arc::new(
                ManimRenderer::new(config.manim.clone()).with_timeout(config.render_timeout),
            ),
            muxer: Arc::new(
                FfmpegMuxer::new(config.ffmpeg.clone()).with_timeout(config.mux_timeout),
            ),
            fs: Arc::new(LocalFs),
        }
    }
}

/// A published video.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub id: RenderId,
    pub video_path: PathBuf,
    /// Public URL under `/videos`
    pub video_url: String,
}

/// Runs render jobs. Cheap to clone; jobs share no mutable state.
#[derive(Clone)]
pub struct RenderCoordinator {
    narrator: NarrationGenerator,
    scripts: ScriptSynthesizer,
    stages: RenderStages,
    layout: StorageLayout,
}

impl RenderCoordinator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        stages: RenderStages,
        layout: StorageLayout,
    ) -> Self {
        Self {
            narrator: NarrationGenerator::new(generator.clone()),
            scripts: ScriptSynthesizer::new(generator),
            stages,
            layout,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Produce and publish the narrated video for one approach.
    pub async fn run(&self, approach: &Approach) -> PipelineResult<RenderOutcome> {
        let started = Instant::now();
        let result = self.run_inner(approach).await;

        let outcome = if result.is_ok() { "succeeded" } else { "failed" };
        metrics::record_job(outcome, started.elapsed());
        result
    }

    async fn run_inner(&self, approach: &Approach) -> PipelineResult<RenderOutcome> {
        let source = approach.primary_source()?;

        let stage_start = Instant::now();
        let narration = self.narrator.generate(source).await?;
        metrics::record_stage(JobStage::NarrationGenerated.as_str(), stage_start.elapsed());

        let stage_start = Instant::now();
        let script = self.scripts.synthesize(source, &narration).await?;
        metrics::record_stage(JobStage::ScriptGenerated.as_str(), stage_start.elapsed());

        let id = script.id;
        let job = RenderJob::new(
            id.clone(),
            script.content,
            narration,
            self.layout.work_dir(&id),
            self.stages.speech.output_path(&id),
            self.layout.published_dir(&id),
        );
        let logger = JobLogger::new(&id, "render_animation");
        let span = logger.create_span();

        self.run_job(job, logger).instrument(span).await
    }

    /// Drive a job from `ScriptGenerated` to a terminal stage.
    async fn run_job(
        &self,
        mut job: RenderJob,
        logger: JobLogger,
    ) -> PipelineResult<RenderOutcome> {
        logger.log_start(&format!(
            "{} narration lines, {} script bytes",
            job.narration.len(),
            job.script.len()
        ));

        // Runs only if this future is dropped before the async cleanup below.
        let guard = scopeguard::guard(job.transient_paths(), |paths| {
            warn!("Render job abandoned, removing transient files");
            for path in &paths {
                if let Err(e) = remove_path_blocking(path) {
                    metrics::record_cleanup_failure();
                    warn!(error = %e, "Cleanup failed");
                }
            }
        });

        let result = self.execute(&mut job, &logger).await;
        self.cleanup(&job, result.is_ok(), &logger).await;
        ScopeGuard::into_inner(guard);

        match result {
            Ok(video_path) => {
                job.advance(JobStage::Cleaned)?;
                let file_name = video_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let video_url = StorageLayout::video_url(&job.id, &file_name);

                logger.log_completion(&format!("{} in {} ms", video_url, job.elapsed_ms()));
                Ok(RenderOutcome {
                    id: job.id,
                    video_path,
                    video_url,
                })
            }
            Err(e) => {
                logger.log_error(&format!(
                    "failed after {} ({} ms): {}",
                    job.stage(),
                    job.elapsed_ms(),
                    e
                ));
                job.fail();
                Err(e)
            }
        }
    }

    async fn execute(&self, job: &mut RenderJob, logger: &JobLogger) -> PipelineResult<PathBuf> {
        let mut stage_start = Instant::now();

        tokio::fs::create_dir_all(&job.work_dir).await?;
        self.stages
            .renderer
            .write_script(&job.work_dir, &job.script)
            .await?;
        enter(job, JobStage::DirectoryPrepared, &mut stage_start, logger)?;

        job.audio_path = self
            .stages
            .speech
            .synthesize(&job.narration, &job.id)
            .await?;
        enter(job, JobStage::AudioSynthesized, &mut stage_start, logger)?;

        enter(job, JobStage::Rendering, &mut stage_start, logger)?;
        let rendered = self.stages.renderer.render(&job.work_dir).await?;
        let located =
            locate_artifact(self.stages.fs.as_ref(), &job.work_dir, VIDEO_EXTENSION).await?;
        let Some(video) = located else {
            return Err(MediaError::ArtifactNotFound {
                dir: job.work_dir.clone(),
                stdout: rendered.stdout,
                stderr: rendered.stderr,
            }
            .into());
        };
        debug!(
            video = %video.display(),
            render_ms = rendered.duration.as_millis() as u64,
            "Rendered video located"
        );
        enter(job, JobStage::ArtifactLocated, &mut stage_start, logger)?;

        let basename = video
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("animation");
        let output = job
            .published_dir
            .join(StorageLayout::published_name(basename, VIDEO_EXTENSION));
        tokio::fs::create_dir_all(&job.published_dir).await?;
        let published = self
            .stages
            .muxer
            .combine(&video, &job.audio_path, &output)
            .await?;
        enter(job, JobStage::Published, &mut stage_start, logger)?;

        Ok(published)
    }

    /// Remove a job's transient files. Safe to call any number of times.
    ///
    /// The published directory is removed too unless the job succeeded.
    /// Failures are logged and counted, never returned.
    pub async fn cleanup(&self, job: &RenderJob, succeeded: bool, logger: &JobLogger) {
        report(remove_dir_if_exists(&job.work_dir).await, logger);
        report(remove_file_if_exists(&job.audio_path).await, logger);
        if !succeeded {
            report(remove_dir_if_exists(&job.published_dir).await, logger);
        }
    }
}

fn enter(
    job: &mut RenderJob,
    stage: JobStage,
    stage_start: &mut Instant,
    logger: &JobLogger,
) -> PipelineResult<()> {
    job.advance(stage)?;
    let elapsed = stage_start.elapsed();
    metrics::record_stage(stage.as_str(), elapsed);
    logger.log_stage(stage, elapsed.as_millis() as u64);
    *stage_start = Instant::now();
    Ok(())
}

fn report(result: Result<bool, CleanupError>, logger: &JobLogger) {
    if let Err(e) = result {
        metrics::record_cleanup_failure();
        logger.log_warning(&e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    use algoviz_llm::LlmResult;
    use algoviz_media::{MediaResult, ProcessOutput};
    use algoviz_models::{Language, NarrationScript};
    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::error::PipelineError;

    const BUBBLE_SORT: &str = "def bubble_sort(a):\n    for i in range(len(a)):\n        for j in range(len(a) - i - 1):\n            if a[j] > a[j + 1]:\n                a[j], a[j + 1] = a[j + 1], a[j]\n";

    /// Answers narration prompts with a JSON array and everything else
    /// with a fenced Manim script.
    struct FakeLlm {
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for FakeLlm {
        async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
            if self.fail {
                return Err(algoviz_llm::LlmError::generation("quota exceeded"));
            }
            if prompt.contains("JSON array of strings") {
                Ok(r#"["We walk the array.", "Adjacent items are compared.", "Larger ones bubble up."]"#.into())
            } else {
                Ok("```python\nfrom manim import *\n\nclass AlgorithmDemo(Scene):\n    def construct(self):\n        self.wait(1)\n```".into())
            }
        }
    }

    struct FakeSpeech {
        root: PathBuf,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        fn output_path(&self, id: &RenderId) -> PathBuf {
            self.root.join(format!("{}.mp3", id))
        }

        async fn synthesize(
            &self,
            narration: &NarrationScript,
            id: &RenderId,
        ) -> MediaResult<PathBuf> {
            let path = self.output_path(id);
            if self.fail {
                tokio::fs::write(&path, b"ID3").await?;
                return Err(MediaError::synthesis_failed(
                    "tts exited with status 1",
                    "",
                    "gTTSError: Failed to connect",
                    Some(1),
                ));
            }
            tokio::fs::write(&path, narration.transcript()).await?;
            Ok(path)
        }
    }

    #[derive(Clone, Copy)]
    enum RenderMode {
        Ok,
        Crash,
        NoOutput,
        Hang,
    }

    struct FakeRenderer {
        mode: RenderMode,
    }

    #[async_trait]
    impl AnimationRenderer for FakeRenderer {
        async fn render(&self, work_dir: &Path) -> MediaResult<ProcessOutput> {
            assert!(work_dir.join(algoviz_media::SCRIPT_FILENAME).exists());
            let output = |code| ProcessOutput {
                exit_code: Some(code),
                stdout: "Manim Community v0.18.1".into(),
                stderr: String::new(),
                duration: Duration::from_millis(5),
            };

            match self.mode {
                RenderMode::Ok => {
                    let out = work_dir.join("media/videos/animation/480p15");
                    tokio::fs::create_dir_all(&out).await?;
                    tokio::fs::write(out.join("AlgorithmDemo.mp4"), b"video").await?;
                    Ok(output(0))
                }
                RenderMode::NoOutput => Ok(ProcessOutput {
                    stderr: "There are no scenes inside that module".into(),
                    ..output(0)
                }),
                RenderMode::Crash => Err(MediaError::RenderFailed {
                    stdout: "Manim Community v0.18.1".into(),
                    stderr: "NameError: name 'Sqaure' is not defined".into(),
                    exit_code: Some(1),
                }),
                RenderMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(output(0))
                }
            }
        }
    }

    struct FakeMuxer {
        fail: bool,
    }

    #[async_trait]
    impl Muxer for FakeMuxer {
        async fn combine(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<PathBuf> {
            if self.fail {
                tokio::fs::write(output, b"partial").await?;
                return Err(MediaError::MuxFailed {
                    stdout: String::new(),
                    stderr: "Invalid data found when processing input".into(),
                    exit_code: Some(1),
                });
            }
            assert!(audio.exists());
            tokio::fs::copy(video, output).await?;
            Ok(output.to_path_buf())
        }
    }

    struct Fixture {
        _dir: TempDir,
        layout: StorageLayout,
        coordinator: RenderCoordinator,
    }

    impl Fixture {
        async fn new(llm_fails: bool, render: RenderMode, mux_fails: bool) -> Self {
            Self::build(llm_fails, false, render, mux_fails).await
        }

        async fn build(
            llm_fails: bool,
            speech_fails: bool,
            render: RenderMode,
            mux_fails: bool,
        ) -> Self {
            let dir = TempDir::new().unwrap();
            let layout = StorageLayout::new(dir.path());
            layout.ensure_roots().await.unwrap();

            let stages = RenderStages {
                speech: Arc::new(FakeSpeech {
                    root: layout.audio_root().to_path_buf(),
                    fail: speech_fails,
                }),
                renderer: Arc::new(FakeRenderer { mode: render }),
                muxer: Arc::new(FakeMuxer { fail: mux_fails }),
                fs: Arc::new(LocalFs),
            };
            let llm = Arc::new(FakeLlm { fail: llm_fails });
            let coordinator = RenderCoordinator::new(llm, stages, layout.clone());

            Self {
                _dir: dir,
                layout,
                coordinator,
            }
        }

        fn count(dir: &Path) -> usize {
            std::fs::read_dir(dir).unwrap().count()
        }

        /// Number of entries left in the transient roots.
        fn residue(&self) -> usize {
            Self::count(self.layout.renders_root()) + Self::count(self.layout.audio_root())
        }

        fn published(&self) -> usize {
            Self::count(self.layout.videos_root())
        }
    }

    fn bubble_sort() -> Approach {
        Approach::new("Bubble Sort", Language::Python, BUBBLE_SORT)
    }

    #[tokio::test]
    async fn test_bubble_sort_publishes_and_leaves_no_residue() {
        let fixture = Fixture::new(false, RenderMode::Ok, false).await;

        let outcome = fixture.coordinator.run(&bubble_sort()).await.unwrap();

        assert_eq!(
            outcome.video_url,
            format!("/videos/{}/AlgorithmDemo_with_audio.mp4", outcome.id)
        );
        assert_eq!(
            outcome.video_path,
            fixture
                .layout
                .published_dir(&outcome.id)
                .join("AlgorithmDemo_with_audio.mp4")
        );
        assert!(outcome.video_path.exists());
        assert_eq!(fixture.residue(), 0);
    }

    #[tokio::test]
    async fn test_render_failure_cleans_up_and_keeps_streams() {
        let fixture = Fixture::new(false, RenderMode::Crash, false).await;

        let err = fixture.coordinator.run(&bubble_sort()).await.unwrap_err();

        let (stdout, stderr) = err.diagnostics();
        assert!(stdout.contains("Manim Community"));
        assert!(stderr.contains("NameError"));
        assert_eq!(fixture.residue(), 0);
        assert_eq!(fixture.published(), 0);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_reported() {
        let fixture = Fixture::new(false, RenderMode::NoOutput, false).await;

        let err = fixture.coordinator.run(&bubble_sort()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Media(MediaError::ArtifactNotFound { .. })
        ));
        let (_, stderr) = err.diagnostics();
        assert!(stderr.contains("There are no scenes inside that module"));
        assert_eq!(fixture.residue(), 0);
    }

    #[tokio::test]
    async fn test_speech_failure_removes_work_dir_and_partial_audio() {
        let fixture = Fixture::build(false, true, RenderMode::Ok, false).await;

        let err = fixture.coordinator.run(&bubble_sort()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Media(MediaError::SynthesisFailed { .. })
        ));
        assert!(err.diagnostics().1.contains("gTTSError"));
        assert_eq!(fixture.residue(), 0);
        assert_eq!(fixture.published(), 0);
    }

    #[tokio::test]
    async fn test_mux_failure_removes_partial_publication() {
        let fixture = Fixture::new(false, RenderMode::Ok, true).await;

        let err = fixture.coordinator.run(&bubble_sort()).await.unwrap_err();

        assert!(err.diagnostics().1.contains("Invalid data"));
        assert_eq!(fixture.residue(), 0);
        assert_eq!(fixture.published(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_touches_nothing() {
        let fixture = Fixture::new(true, RenderMode::Ok, false).await;

        let err = fixture.coordinator.run(&bubble_sort()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Llm(_)));
        assert_eq!(err.diagnostics(), (String::new(), String::new()));
        assert_eq!(fixture.residue(), 0);
    }

    #[tokio::test]
    async fn test_approach_without_code_is_client_error() {
        let fixture = Fixture::new(false, RenderMode::Ok, false).await;
        let approach = Approach::new("Empty", Language::Java, "   ");

        let err = fixture.coordinator.run(&approach).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_concurrent_jobs_are_isolated() {
        let fixture = Fixture::new(false, RenderMode::Ok, false).await;
        let bubble = bubble_sort();
        let two_pointer = Approach::new("Two Pointers", Language::Java, "int i = 0, j = n - 1;");

        let (a, b) = tokio::join!(
            fixture.coordinator.run(&bubble),
            fixture.coordinator.run(&two_pointer)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.id, b.id);
        assert!(a.video_path.exists());
        assert!(b.video_path.exists());
        assert_eq!(fixture.published(), 2);
        assert_eq!(fixture.residue(), 0);
    }

    #[tokio::test]
    async fn test_dropped_job_removes_transient_files() {
        let fixture = Fixture::new(false, RenderMode::Hang, false).await;

        let result = tokio::time::timeout(
            Duration::from_millis(200),
            fixture.coordinator.run(&bubble_sort()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(fixture.residue(), 0);
        assert_eq!(fixture.published(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let fixture = Fixture::new(false, RenderMode::Ok, false).await;
        let id = RenderId::new();
        let job = RenderJob::new(
            id.clone(),
            String::new(),
            NarrationScript::from_lines(["One."]).unwrap(),
            fixture.layout.work_dir(&id),
            fixture.layout.audio_root().join(format!("{}.mp3", id)),
            fixture.layout.published_dir(&id),
        );
        std::fs::create_dir_all(job.work_dir.join("media")).unwrap();
        std::fs::write(&job.audio_path, b"a").unwrap();
        let logger = JobLogger::new(&id, "test");

        fixture.coordinator.cleanup(&job, false, &logger).await;
        fixture.coordinator.cleanup(&job, false, &logger).await;

        assert!(!job.work_dir.exists());
        assert!(!job.audio_path.exists());
    }

    #[cfg(unix)]
    mod external_tools {
        use super::*;
        use algoviz_media::ToolCommand;

        const FAKE_PYTHON: &str = r#"out=$(sed -n 's/^OUTPUT_PATH = "\(.*\)"$/\1/p' "$1")
printf 'ID3' > "$out"
"#;

        const FAKE_MANIM: &str = r#"out=media/videos/animation/480p15
mkdir -p "$out"
cp "$2" "$out/AlgorithmDemo.mp4"
"#;

        const FAKE_FFMPEG: &str = r#"for last; do :; done
printf 'muxed' > "$last"
"#;

        const FAILING_MANIM: &str = r#"echo "Manim Community v0.18.1"
echo "SyntaxError: invalid syntax" >&2
exit 1
"#;

        fn tool(dir: &Path, name: &str, body: &str) -> ToolCommand {
            let path = dir.join(name);
            std::fs::write(&path, body).unwrap();
            ToolCommand::new("sh").arg(path.to_string_lossy())
        }

        async fn coordinator(dir: &TempDir, manim: &str) -> (RenderCoordinator, StorageLayout) {
            let tools = dir.path().join("tools");
            std::fs::create_dir(&tools).unwrap();
            let config = PipelineConfig {
                data_dir: dir.path().join("data"),
                python: tool(&tools, "python.sh", FAKE_PYTHON),
                manim: tool(&tools, "manim.sh", manim),
                ffmpeg: tool(&tools, "ffmpeg.sh", FAKE_FFMPEG),
                ..PipelineConfig::default()
            };
            let layout = config.layout();
            layout.ensure_roots().await.unwrap();

            let coordinator = RenderCoordinator::new(
                Arc::new(FakeLlm { fail: false }),
                RenderStages::from_config(&config),
                layout.clone(),
            );
            (coordinator, layout)
        }

        #[tokio::test]
        async fn test_end_to_end_with_process_stages() {
            let dir = TempDir::new().unwrap();
            let (coordinator, layout) = coordinator(&dir, FAKE_MANIM).await;

            let outcome = coordinator.run(&bubble_sort()).await.unwrap();

            assert!(outcome.video_url.ends_with("/AlgorithmDemo_with_audio.mp4"));
            assert_eq!(std::fs::read_to_string(&outcome.video_path).unwrap(), "muxed");
            assert_eq!(Fixture::count(layout.renders_root()), 0);
            assert_eq!(Fixture::count(layout.audio_root()), 0);
        }

        #[tokio::test]
        async fn test_renderer_exit_one_end_to_end() {
            let dir = TempDir::new().unwrap();
            let (coordinator, layout) = coordinator(&dir, FAILING_MANIM).await;

            let err = coordinator.run(&bubble_sort()).await.unwrap_err();

            assert!(matches!(
                err,
                PipelineError::Media(MediaError::RenderFailed {
                    exit_code: Some(1),
                    ..
                })
            ));
            let (stdout, stderr) = err.diagnostics();
            assert!(stdout.contains("Manim Community"));
            assert!(stderr.contains("SyntaxError"));
            assert_eq!(Fixture::count(layout.renders_root()), 0);
            assert_eq!(Fixture::count(layout.audio_root()), 0);
            assert_eq!(Fixture::count(layout.videos_root()), 0);
        }
    }
}
