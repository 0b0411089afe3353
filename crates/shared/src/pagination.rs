//! # ページネーション
//!
//! ページ番号ベースのページネーション情報を表す値オブジェクト。
//!
//! `skip_count` / `has_next` / `has_previous` は保持せず、常に
//! 保持フィールドから計算する。

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

/// ページネーション情報
///
/// `page_index` は 1 始まり。
///
/// # 不変条件
///
/// - 呼び出し側が `page_index >= 1` かつ `page_size > 0` を保証すること
/// - この型自体は値の補正を行わない。不正な値を渡すと `skip_count` は
///   0 や負の値になる
///
/// ## JSON 形式
///
/// ```json
/// {
///   "page_index": 2,
///   "page_size": 20,
///   "max_page_index": 5,
///   "total_record_count": 87,
///   "skip_count": 20,
///   "has_next": true,
///   "has_previous": true
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page_index:         i64,
    pub page_size:          i64,
    pub max_page_index:     i64,
    pub total_record_count: i64,
}

impl Pagination {
    pub fn new(page_index: i64, page_size: i64, max_page_index: i64, total_record_count: i64) -> Self {
        Self {
            page_index,
            page_size,
            max_page_index,
            total_record_count,
        }
    }

    /// 総件数から最終ページ番号を算出して作成する
    ///
    /// `page_size` が 0 以下、または総件数が負の場合、最終ページ番号は 0 になる。
    ///
    /// ```
    /// use storify_shared::Pagination;
    ///
    /// let page = Pagination::from_total(2, 20, 87);
    /// assert_eq!(page.max_page_index, 5);
    /// assert_eq!(page.skip_count(), 20);
    /// assert!(page.has_next());
    /// assert!(page.has_previous());
    /// ```
    pub fn from_total(page_index: i64, page_size: i64, total_record_count: i64) -> Self {
        let total = u64::try_from(total_record_count).unwrap_or(0);
        let max_page_index = match u64::try_from(page_size) {
            Ok(size) if size > 0 => i64::try_from(total.div_ceil(size)).unwrap_or(i64::MAX),
            _ => 0,
        };
        Self::new(page_index, page_size, max_page_index, total_record_count)
    }

    /// 読み飛ばす件数
    ///
    /// `i64` に収まらない場合は飽和させる。
    pub fn skip_count(&self) -> i64 {
        self.page_index.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// 読み飛ばす件数。`i64` に収まらなければ `None`
    pub fn checked_skip_count(&self) -> Option<i64> {
        self.page_index.checked_sub(1)?.checked_mul(self.page_size)
    }

    /// 次のページが存在するか
    pub fn has_next(&self) -> bool {
        self.page_index < self.max_page_index
    }

    /// 前のページが存在するか
    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Pagination", 7)?;
        state.serialize_field("page_index", &self.page_index)?;
        state.serialize_field("page_size", &self.page_size)?;
        state.serialize_field("max_page_index", &self.max_page_index)?;
        state.serialize_field("total_record_count", &self.total_record_count)?;
        state.serialize_field("skip_count", &self.skip_count())?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.end()
    }
}

/// ページネーション付きレスポンスのデータ部
///
/// `ApiResponse<Paginated<T>>` の形で返す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items:      Vec<T>,
    pub pagination: Pagination,
}
