//! Library Queries - 书库与阅读位置的只读查询

/// 列出书库中的所有小说
#[derive(Debug, Clone, Default)]
pub struct ListNovels;

/// 列出当前小说的章节
#[derive(Debug, Clone, Default)]
pub struct ListChapters;

/// 当前小说与上次读到的位置
#[derive(Debug, Clone, Default)]
pub struct WhereAmI;

/// 当前的书库设置
#[derive(Debug, Clone, Default)]
pub struct ShowSettings;
