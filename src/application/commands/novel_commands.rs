//! Novel Commands - 书库管理

use std::path::PathBuf;

/// 加入小说命令（检测格式、切分章节并设为当前小说）
#[derive(Debug, Clone)]
pub struct AddNovel {
    pub path: PathBuf,
}

/// 删除小说命令（`list` 中的 1 起始序号）
#[derive(Debug, Clone)]
pub struct RemoveNovel {
    pub index: usize,
}

/// 切换当前小说命令（`list` 中的 1 起始序号）
#[derive(Debug, Clone)]
pub struct SwitchNovel {
    pub index: usize,
}

/// 切换配置项命令
#[derive(Debug, Clone)]
pub struct ToggleSetting {
    pub setting: String,
}
