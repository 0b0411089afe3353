//! # ページ指定クエリ
//!
//! 一覧 API 共通のクエリパラメータ。

use serde::Deserialize;
use validator::Validate;

/// 既定のページ番号
pub const DEFAULT_PAGE_INDEX: i64 = 1;

/// 既定のページサイズ
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// ページサイズの上限
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page_index=2&page_size=20` 形式のページ指定
///
/// 省略されたパラメータは既定値で補う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_page_index")]
    #[validate(range(min = 1, message = "'page_index' は 1 以上で指定してください"))]
    pub page_index: i64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "'page_size' は 1 以上 100 以下で指定してください"))]
    pub page_size:  i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_index: DEFAULT_PAGE_INDEX,
            page_size:  DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page_index() -> i64 {
    DEFAULT_PAGE_INDEX
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}
