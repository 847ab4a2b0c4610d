//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、LibraryStore）
//! - session: 命令执行期间独占的内存状态
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod session;

// Re-exports
pub use commands::{
    // Novel commands
    AddNovel,
    RemoveNovel,
    SwitchNovel,
    ToggleSetting,
    // Narration commands
    NextChapter,
    PrevChapter,
    ReadChapter,
    // Handlers
    handlers::{
        AddNovelHandler, AddNovelResponse, ChapterStep, ChapterStepHandler, NarrationReport,
        ReadChapterHandler, RemoveNovelHandler, RemoveNovelResponse, SwitchNovelHandler,
        SwitchNovelResponse, ToggleSettingHandler, ToggleSettingResponse, DEFAULT_FLUSH_EVERY,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Library store
    LibraryRecord,
    LibraryStorePort,
    NovelEntry,
    ProgressData,
    ProgressRecord,
    RepositoryError,
    // Speech engine
    SpeechEnginePort,
    SpeechError,
    SpeechHandle,
};

pub use queries::{
    ListChapters,
    ListNovels,
    ShowSettings,
    WhereAmI,
    // Handlers
    handlers::{
        ChapterListResponse, ListChaptersHandler, ListNovelsHandler, NovelSummary,
        SettingsResponse, ShowSettingsHandler, WhereAmIHandler, WhereAmIResponse,
    },
};

pub use session::Session;
