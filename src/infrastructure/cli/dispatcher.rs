//! CLI Dispatcher
//!
//! 持有 Session，把每个子命令交给对应的处理器，并把结果输出到 stdout。
//! 日志与错误走 stderr

use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::commands::Commands;
use crate::application::commands::handlers::{
    AddNovelHandler, ChapterStep, ChapterStepHandler, NarrationReport, ReadChapterHandler,
    RemoveNovelHandler, SwitchNovelHandler, ToggleSettingHandler,
};
use crate::application::commands::{
    AddNovel, NextChapter, PrevChapter, ReadChapter, RemoveNovel, SwitchNovel, ToggleSetting,
};
use crate::application::error::ApplicationError;
use crate::application::ports::SpeechEnginePort;
use crate::application::queries::handlers::{
    ListChaptersHandler, ListNovelsHandler, ShowSettingsHandler, WhereAmIHandler,
};
use crate::application::queries::{ListChapters, ListNovels, ShowSettings, WhereAmI};
use crate::application::session::Session;
use crate::config::AppConfig;
use crate::domain::narration::{NarrationState, StopReason};
use crate::infrastructure::events::{EventPublisher, NarrationEvent};

/// 命令执行结果（用于决定退出码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// 命令本身完成了，但朗读因语音错误中止
    Failure,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

/// 命令分发器
pub struct Dispatcher {
    session: Session,
    events: Arc<EventPublisher>,
    add: AddNovelHandler,
    remove: RemoveNovelHandler,
    switch: SwitchNovelHandler,
    toggle: ToggleSettingHandler,
    reader: ReadChapterHandler,
    step: ChapterStepHandler,
    list_novels: ListNovelsHandler,
    list_chapters: ListChaptersHandler,
    where_am_i: WhereAmIHandler,
    settings: ShowSettingsHandler,
}

impl Dispatcher {
    pub fn new(session: Session, speech: Arc<dyn SpeechEnginePort>, config: &AppConfig) -> Self {
        let events = EventPublisher::new().arc();
        let flush_every = config.narration.flush_every;
        let reader = || ReadChapterHandler::new(speech.clone(), events.clone(), flush_every);

        Self {
            add: AddNovelHandler::new(config.narration.detect_sample_bytes),
            remove: RemoveNovelHandler::new(),
            switch: SwitchNovelHandler::new(),
            toggle: ToggleSettingHandler::new(),
            reader: reader(),
            step: ChapterStepHandler::new(reader()),
            list_novels: ListNovelsHandler::new(),
            list_chapters: ListChaptersHandler::new(),
            where_am_i: WhereAmIHandler::new(),
            settings: ShowSettingsHandler::new(),
            events,
            session,
        }
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// 执行一个子命令
    pub async fn dispatch(&mut self, command: Commands) -> Result<Outcome, ApplicationError> {
        tracing::debug!(command = ?command, "Dispatching");

        match command {
            Commands::Add { path } => {
                println!("Adding novel: {}", path.display());
                match self.add.handle(&mut self.session, AddNovel { path }).await {
                    Ok(added) => {
                        println!("Detected format: {}", added.pattern);
                        println!(
                            "Successfully added '{}' with {} chapters and set as active.",
                            added.path, added.chapter_count
                        );
                    }
                    // 重复添加只提示，不算失败
                    Err(e @ ApplicationError::AlreadyExists(_)) => println!("{}", e),
                    Err(e) => return Err(e),
                }
            }

            Commands::List => {
                let novels = self.list_novels.handle(&self.session, ListNovels).await?;
                if novels.is_empty() {
                    println!("Library is empty. Use 'add <filepath>' to add a novel.");
                } else {
                    println!("Novels in library:");
                    for novel in novels {
                        println!(
                            " {} {}: {} ({} chapters, last read: Ch {}, Seg {})",
                            if novel.is_active { "*" } else { " " },
                            novel.index,
                            novel.file_name,
                            novel.chapter_count,
                            novel.chapter_index.saturating_add(1),
                            novel.segment_index
                        );
                    }
                }
            }

            Commands::Remove { index } => {
                let removed = self
                    .remove
                    .handle(&mut self.session, RemoveNovel { index })
                    .await?;
                println!("Removed novel {}: {}", removed.index, removed.path.file_name());
                if removed.was_active {
                    println!("The active novel was removed.");
                }
            }

            Commands::Switch { index } => {
                let switched = self
                    .switch
                    .handle(&mut self.session, SwitchNovel { index })
                    .await?;
                if switched.already_active {
                    println!("Novel '{}' is already active.", switched.path);
                } else {
                    println!("Switched active novel to: {}", switched.path);
                    if switched.chapter_count.is_none() {
                        println!("Warning: chapters could not be loaded for this novel.");
                    }
                }
            }

            Commands::Chapters => {
                let chapters = self
                    .list_chapters
                    .handle(&mut self.session, ListChapters)
                    .await?;
                println!("Chapters for '{}':", chapters.path.file_name());
                for (i, title) in chapters.titles.iter().enumerate() {
                    let marker = if i == chapters.current_chapter { "*" } else { " " };
                    println!(" {} {}: {}", marker, i + 1, title);
                }
            }

            Commands::Read { chapter } => {
                let mut rx = self.events.subscribe();
                let read = self.reader.handle(&mut self.session, ReadChapter { chapter });
                let report = with_live_output(&mut rx, read).await?;
                return Ok(print_report(&report));
            }

            Commands::Next => {
                let mut rx = self.events.subscribe();
                let step = self.step.next(&mut self.session, NextChapter);
                return Ok(match with_live_output(&mut rx, step).await? {
                    ChapterStep::Read(report) => print_report(&report),
                    _ => {
                        println!("Already at the last chapter.");
                        Outcome::Success
                    }
                });
            }

            Commands::Prev => {
                let mut rx = self.events.subscribe();
                let step = self.step.prev(&mut self.session, PrevChapter);
                return Ok(match with_live_output(&mut rx, step).await? {
                    ChapterStep::Read(report) => print_report(&report),
                    _ => {
                        println!("Already at the first chapter.");
                        Outcome::Success
                    }
                });
            }

            Commands::Where => {
                let here = self.where_am_i.handle(&self.session, WhereAmI).await?;
                let title = here
                    .chapter_title
                    .unwrap_or_else(|| "(chapter index out of bounds)".to_string());
                println!("Active novel: {}", here.path);
                println!(
                    "Last read: Chapter {} ({}), Segment {}",
                    here.chapter_index.saturating_add(1),
                    title,
                    here.segment_index
                );
                if let Some(updated_at) = here.updated_at {
                    println!("Updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
            }

            Commands::Config { setting: None } => {
                let settings = self.settings.handle(&self.session, ShowSettings).await?;
                println!("Current Configuration:");
                println!("  auto_next: {}", settings.auto_next);
            }

            Commands::Config {
                setting: Some(setting),
            } => {
                let toggled = self
                    .toggle
                    .handle(&mut self.session, ToggleSetting { setting })
                    .await?;
                println!("Set {} to: {}", toggled.setting, toggled.enabled);
            }
        }

        Ok(Outcome::Success)
    }
}

/// 运行朗读的同时把事件打印出来，保证先输出已发布的事件再返回结果
async fn with_live_output<F, T>(rx: &mut broadcast::Receiver<NarrationEvent>, work: F) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    let result = loop {
        tokio::select! {
            biased;
            event = rx.recv() => match event {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Narration output lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break work.await,
            },
            result = &mut work => break result,
        }
    };
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }
    result
}

fn print_event(event: &NarrationEvent) {
    match event {
        NarrationEvent::ChapterStarted { chapter, title, .. } => {
            println!("--- Reading Chapter {}: {} ---", chapter + 1, title);
        }
        NarrationEvent::ProgressCorrected { chapter, segment } => {
            println!(
                "Stored position was invalid, continuing from chapter {}, segment {}.",
                chapter + 1,
                segment
            );
        }
        NarrationEvent::SegmentStarted {
            segment,
            total_segments,
            text,
            ..
        } => {
            println!("\n[Segment {}/{}]\n{}", segment + 1, total_segments, text);
        }
        NarrationEvent::SegmentFinished { .. } => println!("(Segment finished)"),
        NarrationEvent::ChapterFinished { .. } => println!("Chapter finished."),
        NarrationEvent::NovelFinished => println!("Reached the end of the novel."),
    }
}

fn print_report(report: &NarrationReport) -> Outcome {
    match &report.state {
        NarrationState::Stopped {
            reason: StopReason::AutoAdvanceDisabled,
            ..
        } => {
            println!("Auto-next disabled. Stopping.");
            Outcome::Success
        }
        NarrationState::Stopped {
            chapter,
            segment,
            reason,
        } => {
            let detail = match reason {
                StopReason::SubmissionFailed(e) => format!("could not start speech: {}", e),
                StopReason::CompletionFailed(e) => format!("speech failed: {}", e),
                StopReason::AutoAdvanceDisabled => String::new(),
            };
            eprintln!(
                "Error: narration stopped at chapter {}, segment {}: {}",
                chapter + 1,
                segment,
                detail
            );
            Outcome::Failure
        }
        NarrationState::ChapterComplete { .. } => {
            println!("Chapter content appears empty or has no segments.");
            Outcome::Success
        }
        NarrationState::NovelComplete | NarrationState::Idle | NarrationState::Speaking { .. } => {
            Outcome::Success
        }
    }
}
