//! Narration Command Handlers - 逐段朗读
//!
//! 状态机: Idle -> Speaking(章, 段) -> Stopped | ChapterComplete | NovelComplete
//!
//! 进度规则:
//! - 切换章节时先立即保存 (章, 0)，再开始朗读
//! - 片段提交成功后立刻把内存进度记为该片段（“至少到达”），进程若在朗读中退出，
//!   恢复时会重读该片段而不是跳过
//! - 每完成 `flush_every` 段顺带落盘一次，其余时间只标记为脏
//! - 越界的进度视为损坏，重置为 (0, 0) 并立即保存

use std::sync::Arc;

use crate::application::commands::{NextChapter, PrevChapter, ReadChapter};
use crate::application::error::ApplicationError;
use crate::application::ports::SpeechEnginePort;
use crate::application::session::Session;
use crate::domain::narration::{NarrationState, StopReason};
use crate::domain::novel::NovelPath;
use crate::infrastructure::events::{EventPublisher, NarrationEvent};

/// 默认的顺带落盘间隔（完成的片段数）
pub const DEFAULT_FLUSH_EVERY: usize = 20;

/// 一次朗读调用的结果
#[derive(Debug, Clone)]
pub struct NarrationReport {
    pub path: NovelPath,
    pub state: NarrationState,
    /// 本次调用中完整读完的片段数
    pub segments_spoken: usize,
}

/// ReadChapter Handler - 朗读主循环
pub struct ReadChapterHandler {
    speech: Arc<dyn SpeechEnginePort>,
    events: Arc<EventPublisher>,
    flush_every: usize,
}

impl ReadChapterHandler {
    pub fn new(
        speech: Arc<dyn SpeechEnginePort>,
        events: Arc<EventPublisher>,
        flush_every: usize,
    ) -> Self {
        Self {
            speech,
            events,
            flush_every: flush_every.max(1),
        }
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        command: ReadChapter,
    ) -> Result<NarrationReport, ApplicationError> {
        let path = session.require_active()?;
        let chapter_count = session.ensure_chapters(&path).await?;

        let mut target = match command.chapter {
            Some(index) => Some(ApplicationError::check_index(index, chapter_count)?),
            None => None,
        };
        let auto_advance = session.auto_read_next();
        let mut spoken = 0usize;

        // 自动进入下一章用循环实现，每一轮都重新走一遍切章保存逻辑
        loop {
            let stored = session.progress(&path);
            let mut chapter = stored.chapter_index;
            let mut start = stored.segment_index;

            if let Some(next) = target.take() {
                if next != chapter {
                    chapter = next;
                    start = 0;
                    tracing::info!(path = %path, chapter = chapter + 1, "Switching chapter, saving progress");
                    session.record_progress(&path, chapter, 0);
                    session.persist_progress().await;
                }
            }

            if chapter >= chapter_count {
                tracing::warn!(
                    path = %path,
                    chapter = chapter.saturating_add(1),
                    chapter_count = chapter_count,
                    "Stored chapter index is invalid, resetting to first chapter"
                );
                chapter = 0;
                start = 0;
                self.heal(session, &path, 0).await;
            }

            let current = session
                .chapter(&path, chapter)
                .ok_or_else(|| ApplicationError::not_found("Chapter", chapter + 1))?;
            let title = current.title().to_string();
            let segments = current.segments();

            self.events.publish(NarrationEvent::ChapterStarted {
                chapter,
                title,
                total_segments: segments.len(),
            });

            if segments.is_empty() {
                tracing::info!(path = %path, chapter = chapter + 1, "Chapter has no readable segments");
                return Ok(self.report(path, NarrationState::ChapterComplete { chapter }, spoken));
            }

            if start >= segments.len() {
                tracing::warn!(
                    path = %path,
                    chapter = chapter + 1,
                    segment = start,
                    segment_count = segments.len(),
                    "Stored segment index is invalid, starting from segment 0"
                );
                start = 0;
                self.heal(session, &path, chapter).await;
            }

            for (segment, text) in segments.iter().enumerate().skip(start) {
                let speaking = NarrationState::Speaking { chapter, segment };
                tracing::debug!(state = ?speaking, "Narration state");
                self.events.publish(NarrationEvent::SegmentStarted {
                    chapter,
                    segment,
                    total_segments: segments.len(),
                    text: text.clone(),
                });

                let handle = match self.speech.speak(text) {
                    Ok(handle) => handle,
                    Err(e) => {
                        tracing::error!(
                            chapter = chapter + 1,
                            segment = segment,
                            error = %e,
                            "Failed to start speech"
                        );
                        let reason = StopReason::SubmissionFailed(e.to_string());
                        return Ok(self.stopped(path, chapter, segment, reason, spoken));
                    }
                };

                session.record_progress(&path, chapter, segment);

                if let Err(e) = handle.wait().await {
                    tracing::error!(
                        chapter = chapter + 1,
                        segment = segment,
                        error = %e,
                        "Speech failed"
                    );
                    let reason = StopReason::CompletionFailed(e.to_string());
                    return Ok(self.stopped(path, chapter, segment, reason, spoken));
                }

                spoken += 1;
                self.events
                    .publish(NarrationEvent::SegmentFinished { chapter, segment });

                if spoken % self.flush_every == 0 {
                    session.flush_progress().await;
                }

                if !auto_advance {
                    tracing::info!("Auto-next disabled, stopping");
                    let reason = StopReason::AutoAdvanceDisabled;
                    return Ok(self.stopped(path, chapter, segment, reason, spoken));
                }
            }

            self.events.publish(NarrationEvent::ChapterFinished { chapter });

            if chapter + 1 < chapter_count {
                tracing::info!(chapter = chapter + 2, "Chapter finished, reading next chapter");
                target = Some(chapter + 1);
                continue;
            }

            tracing::info!(path = %path, "Reached the end of the novel");
            self.events.publish(NarrationEvent::NovelFinished);
            return Ok(self.report(path, NarrationState::NovelComplete, spoken));
        }
    }

    /// 把越界的进度纠正为 (chapter, 0) 并立即保存
    async fn heal(&self, session: &mut Session, path: &NovelPath, chapter: usize) {
        session.record_progress(path, chapter, 0);
        session.flush_progress().await;
        self.events
            .publish(NarrationEvent::ProgressCorrected { chapter, segment: 0 });
    }

    fn stopped(
        &self,
        path: NovelPath,
        chapter: usize,
        segment: usize,
        reason: StopReason,
        spoken: usize,
    ) -> NarrationReport {
        self.report(
            path,
            NarrationState::Stopped {
                chapter,
                segment,
                reason,
            },
            spoken,
        )
    }

    fn report(&self, path: NovelPath, state: NarrationState, spoken: usize) -> NarrationReport {
        NarrationReport {
            path,
            state,
            segments_spoken: spoken,
        }
    }
}

// ============================================================================
// NextChapter / PrevChapter
// ============================================================================

/// 上一章/下一章的结果
#[derive(Debug, Clone)]
pub enum ChapterStep {
    Read(NarrationReport),
    AlreadyAtFirst,
    AlreadyAtLast,
}

/// NextChapter / PrevChapter Handler
///
/// 以已保存的章节为基准计算目标章节，再交给 [`ReadChapterHandler`]
pub struct ChapterStepHandler {
    reader: ReadChapterHandler,
}

impl ChapterStepHandler {
    pub fn new(reader: ReadChapterHandler) -> Self {
        Self { reader }
    }

    pub async fn next(
        &self,
        session: &mut Session,
        _command: NextChapter,
    ) -> Result<ChapterStep, ApplicationError> {
        let path = session.require_active()?;
        let chapter_count = session.ensure_chapters(&path).await?;
        let next = session.progress(&path).chapter_index.saturating_add(1);
        if next >= chapter_count {
            return Ok(ChapterStep::AlreadyAtLast);
        }
        self.read(session, next).await
    }

    pub async fn prev(
        &self,
        session: &mut Session,
        _command: PrevChapter,
    ) -> Result<ChapterStep, ApplicationError> {
        let path = session.require_active()?;
        session.ensure_chapters(&path).await?;
        let current = session.progress(&path).chapter_index;
        if current == 0 {
            return Ok(ChapterStep::AlreadyAtFirst);
        }
        self.read(session, current - 1).await
    }

    async fn read(&self, session: &mut Session, chapter: usize) -> Result<ChapterStep, ApplicationError> {
        let command = ReadChapter {
            chapter: Some(chapter + 1),
        };
        self.reader
            .handle(session, command)
            .await
            .map(ChapterStep::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NovelEntry, ProgressRecord};
    use crate::domain::novel::{split_chapters, HeadingPattern};
    use crate::infrastructure::adapters::tts::{FakeSpeechClient, SpeechScript};
    use crate::infrastructure::memory::InMemoryLibraryStore;
    use std::time::Duration;

    const TEXT: &str = "Chapter 1\nHello\n\nWorld\n\nChapter 2\nBye\n\nChapter 3\nOne\nTwo\nThree\n";

    struct Fixture {
        store: Arc<InMemoryLibraryStore>,
        speech: Arc<FakeSpeechClient>,
        session: Session,
        path: NovelPath,
    }

    impl Fixture {
        async fn new(script: SpeechScript, auto_next: bool) -> Self {
            Self::with_text(TEXT, HeadingPattern::English, script, auto_next).await
        }

        async fn with_text(
            text: &str,
            pattern: HeadingPattern,
            script: SpeechScript,
            auto_next: bool,
        ) -> Self {
            let store = Arc::new(InMemoryLibraryStore::new());
            let mut session = Session::load(store.clone()).await;
            let path = NovelPath::from("/books/novel.txt");
            let chapters = split_chapters(text, pattern).unwrap();
            session.insert_novel(NovelEntry::new(path.clone(), pattern, chapters));
            session.set_active(Some(path.clone()));
            session.set_auto_read_next(auto_next);
            session.flush().await;
            Self {
                store,
                speech: Arc::new(FakeSpeechClient::new(script)),
                session,
                path,
            }
        }

        fn handler(&self, flush_every: usize) -> ReadChapterHandler {
            ReadChapterHandler::new(
                self.speech.clone(),
                Arc::new(EventPublisher::new()),
                flush_every,
            )
        }

        async fn read(&mut self, chapter: Option<usize>) -> Result<NarrationReport, ApplicationError> {
            let handler = self.handler(DEFAULT_FLUSH_EVERY);
            handler.handle(&mut self.session, ReadChapter { chapter }).await
        }

        fn position(&self) -> (usize, usize) {
            let p = self.session.progress(&self.path);
            (p.chapter_index, p.segment_index)
        }

        fn stored_position(&self) -> Option<(usize, usize)> {
            self.store
                .progress()
                .get(&self.path)
                .map(|p| (p.chapter_index, p.segment_index))
        }
    }

    #[tokio::test]
    async fn test_auto_advance_off_stops_after_one_segment() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;

        let report = fx.read(None).await.unwrap();

        assert_eq!(report.segments_spoken, 1);
        assert_eq!(fx.speech.spoken(), vec!["Hello"]);
        assert_eq!(
            report.state,
            NarrationState::Stopped {
                chapter: 0,
                segment: 0,
                reason: StopReason::AutoAdvanceDisabled
            }
        );
        assert_eq!(fx.position(), (0, 0));
    }

    #[tokio::test]
    async fn test_auto_advance_reads_to_end_of_novel() {
        let mut fx = Fixture::new(SpeechScript::default(), true).await;

        let report = fx.read(None).await.unwrap();

        assert_eq!(report.state, NarrationState::NovelComplete);
        assert_eq!(
            fx.speech.spoken(),
            vec!["Hello", "World", "Bye", "One", "Two", "Three"]
        );
        assert_eq!(report.segments_spoken, 6);
        assert_eq!(fx.position(), (2, 2));
    }

    #[tokio::test]
    async fn test_resume_from_stored_position() {
        let mut fx = Fixture::new(SpeechScript::default(), true).await;
        fx.session.record_progress(&fx.path, 2, 1);

        fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Two", "Three"]);
    }

    #[tokio::test]
    async fn test_explicit_chapter_persists_before_speaking() {
        let mut fx = Fixture::new(SpeechScript::default().fail_submission_at(0), true).await;
        fx.session.record_progress(&fx.path, 0, 1);

        let report = fx.read(Some(3)).await.unwrap();

        // 切章后的位置已经落盘，即便第一段就提交失败
        assert_eq!(fx.stored_position(), Some((2, 0)));
        assert!(report.state.is_failure());
        assert!(fx.speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_same_chapter_argument_resumes_segment() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.session.record_progress(&fx.path, 2, 2);

        fx.read(Some(3)).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Three"]);
    }

    #[tokio::test]
    async fn test_invalid_chapter_argument() {
        let mut fx = Fixture::new(SpeechScript::default(), true).await;

        for chapter in [0, 4] {
            let result = fx.read(Some(chapter)).await;
            assert!(matches!(
                result,
                Err(ApplicationError::IndexOutOfRange { max: 3, .. })
            ));
        }
        assert!(fx.speech.spoken().is_empty());
        assert_eq!(fx.stored_position(), None);
    }

    #[tokio::test]
    async fn test_submission_failure_keeps_last_started_segment() {
        let mut fx = Fixture::new(SpeechScript::default().fail_submission_at(2), true).await;

        let report = fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Hello", "World"]);
        assert_eq!(report.segments_spoken, 2);
        match report.state {
            NarrationState::Stopped {
                chapter,
                segment,
                reason: StopReason::SubmissionFailed(_),
            } => assert_eq!((chapter, segment), (1, 0)),
            other => panic!("unexpected state: {:?}", other),
        }
        // 第 2 章的切章保存已发生，但失败的片段没有记为已到达
        assert_eq!(fx.position(), (1, 0));
    }

    #[tokio::test]
    async fn test_completion_failure_stops_without_advancing() {
        let mut fx = Fixture::new(SpeechScript::default().fail_completion_at(1), true).await;

        let report = fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Hello", "World"]);
        assert_eq!(report.segments_spoken, 1);
        assert!(matches!(
            report.state,
            NarrationState::Stopped {
                chapter: 0,
                segment: 1,
                reason: StopReason::CompletionFailed(_)
            }
        ));
        // 已提交的片段算作到达
        assert_eq!(fx.position(), (0, 1));
    }

    #[tokio::test]
    async fn test_crash_mid_segment_resumes_same_segment() {
        let mut fx = Fixture::new(SpeechScript::default().hang_at(1), true).await;
        let handler = fx.handler(DEFAULT_FLUSH_EVERY);

        let read = handler.handle(&mut fx.session, ReadChapter::default());
        let outcome = tokio::time::timeout(Duration::from_millis(100), read).await;
        assert!(outcome.is_err(), "narration should still be waiting on speech");

        // 模拟收到信号后的落盘
        fx.session.flush().await;
        assert_eq!(fx.stored_position(), Some((0, 1)));

        // 重启后从同一片段继续
        let restarted = Session::load(fx.store.clone()).await;
        let p = restarted.progress(&fx.path);
        assert_eq!((p.chapter_index, p.segment_index), (0, 1));
    }

    #[tokio::test]
    async fn test_periodic_flush() {
        let mut fx = Fixture::new(SpeechScript::default(), true).await;
        let baseline = fx.store.progress_saves();

        let handler = fx.handler(2);
        handler
            .handle(&mut fx.session, ReadChapter::default())
            .await
            .unwrap();

        // 两次切章保存 + 第 2、6 段后的顺带保存；第 4 段时刚切完章，没有可保存的内容
        assert_eq!(fx.store.progress_saves() - baseline, 4);
    }

    #[tokio::test]
    async fn test_corrupt_chapter_index_is_reset_and_persisted() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.session.record_progress(&fx.path, 42, 7);

        fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Hello"]);
        assert_eq!(fx.stored_position(), Some((0, 0)));
    }

    #[tokio::test]
    async fn test_max_chapter_index_is_reset_with_logging_enabled() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.session.record_progress(&fx.path, usize::MAX, 0);

        fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Hello"]);
        assert_eq!(fx.stored_position(), Some((0, 0)));
    }

    #[tokio::test]
    async fn test_next_from_max_chapter_index_is_at_last() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.session.record_progress(&fx.path, usize::MAX, 0);
        let step = ChapterStepHandler::new(fx.handler(DEFAULT_FLUSH_EVERY));

        assert!(matches!(
            step.next(&mut fx.session, NextChapter).await.unwrap(),
            ChapterStep::AlreadyAtLast
        ));
        assert!(fx.speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_segment_index_is_reset_and_persisted() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.session.record_progress(&fx.path, 1, 9);

        fx.read(None).await.unwrap();

        assert_eq!(fx.speech.spoken(), vec!["Bye"]);
        assert_eq!(fx.stored_position(), Some((1, 0)));
    }

    #[tokio::test]
    async fn test_empty_chapter_completes_without_speech() {
        let text = "# Empty\n\n# Full\ncontent\n";
        let mut fx =
            Fixture::with_text(text, HeadingPattern::Markdown, SpeechScript::default(), true).await;

        let report = fx.read(None).await.unwrap();

        assert_eq!(report.state, NarrationState::ChapterComplete { chapter: 0 });
        assert!(fx.speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_progress_stays_in_bounds() {
        let mut fx = Fixture::new(SpeechScript::default(), true).await;
        for chapter in 1..=3 {
            fx.read(Some(chapter)).await.unwrap();
            let (c, s) = fx.position();
            let segments = fx.session.chapter(&fx.path, c).unwrap().segments();
            assert!(c < 3);
            assert!(s < segments.len());
        }
    }

    #[tokio::test]
    async fn test_no_active_novel() {
        let store = Arc::new(InMemoryLibraryStore::new());
        let mut session = Session::load(store).await;
        let handler = ReadChapterHandler::new(
            Arc::new(FakeSpeechClient::default()),
            Arc::new(EventPublisher::new()),
            DEFAULT_FLUSH_EVERY,
        );

        let result = handler.handle(&mut session, ReadChapter::default()).await;
        assert!(matches!(result, Err(ApplicationError::NoActiveNovel)));
    }

    #[tokio::test]
    async fn test_events_describe_narration() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        let events = Arc::new(EventPublisher::new());
        let mut rx = events.subscribe();
        let handler = ReadChapterHandler::new(fx.speech.clone(), events, DEFAULT_FLUSH_EVERY);

        handler
            .handle(&mut fx.session, ReadChapter { chapter: Some(2) })
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            NarrationEvent::ChapterStarted {
                chapter: 1,
                title: "Chapter 2".into(),
                total_segments: 1
            }
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            NarrationEvent::SegmentStarted { segment: 0, .. }
        ));
        assert_eq!(
            rx.recv().await.unwrap(),
            NarrationEvent::SegmentFinished { chapter: 1, segment: 0 }
        );
    }

    #[tokio::test]
    async fn test_next_and_prev() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        let step = ChapterStepHandler::new(fx.handler(DEFAULT_FLUSH_EVERY));

        assert!(matches!(
            step.prev(&mut fx.session, PrevChapter).await.unwrap(),
            ChapterStep::AlreadyAtFirst
        ));

        step.next(&mut fx.session, NextChapter).await.unwrap();
        assert_eq!(fx.position(), (1, 0));
        step.next(&mut fx.session, NextChapter).await.unwrap();
        assert_eq!(fx.position(), (2, 0));

        assert!(matches!(
            step.next(&mut fx.session, NextChapter).await.unwrap(),
            ChapterStep::AlreadyAtLast
        ));

        step.prev(&mut fx.session, PrevChapter).await.unwrap();
        assert_eq!(fx.position(), (1, 0));
        assert_eq!(fx.speech.spoken(), vec!["Bye", "One", "Bye"]);
    }

    #[tokio::test]
    async fn test_progress_record_timestamp_is_set() {
        let mut fx = Fixture::new(SpeechScript::default(), false).await;
        fx.read(Some(2)).await.unwrap();
        let stored: ProgressRecord = fx.store.progress()[&fx.path];
        assert!(stored.updated_at.is_some());
    }
}
