/// 依固定大小將有序列表切成連續的群組
///
/// `size` 為 0 時整個列表即為一組；否則產生 `ceil(len / size)` 組，
/// 最後一組可能較短。不重新排序。
#[must_use]
pub fn group<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if size == 0 {
        return vec![items];
    }
    items.chunks(size).collect()
}
