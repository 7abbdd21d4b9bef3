// crates/ft_io/src/import/zone.rs

//! 边界区 `.zone` 文件读取
//!
//! 流动求解器的边界区文件列出属于某区的节点编号（1 基）：
//!
//! ```text
//! zone
//! 00001  boundary_left
//! nnum
//!   <count>
//!   <id> <id> ... （每行至多 10 个）
//! ```
//!
//! 解析按词法扫描：找到 `nnum` 关键字后读取计数与编号，对行宽
//! 不做假设。

use ft_foundation::error::{FtError, FtResult};
use std::path::Path;
use tracing::debug;

/// 从文件读取边界区节点编号（0 基）
pub fn load_zone(path: &Path) -> FtResult<Vec<u32>> {
    if !path.is_file() {
        return Err(FtError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    parse_zone_string(&content, path)
}

/// 从字符串解析边界区
pub fn parse_zone_string(content: &str, origin: impl AsRef<Path>) -> FtResult<Vec<u32>> {
    let origin = origin.as_ref();

    // 带行号的词法流
    let mut tokens = content
        .lines()
        .enumerate()
        .flat_map(|(i, l)| l.split_whitespace().map(move |t| (i + 1, t)));

    let nnum_line = tokens
        .by_ref()
        .find(|(_, t)| t.eq_ignore_ascii_case("nnum"))
        .map(|(line, _)| line)
        .ok_or_else(|| FtError::parse(origin, 1, "未找到 `nnum` 关键字"))?;

    let (line, count_raw) = tokens
        .next()
        .ok_or_else(|| FtError::parse(origin, nnum_line, "`nnum` 后缺少节点计数"))?;
    let count: usize = count_raw
        .parse()
        .map_err(|_| FtError::parse(origin, line, format!("无法解析节点计数: `{count_raw}`")))?;
    if count == 0 {
        return Err(FtError::parse(origin, line, "边界区为空"));
    }

    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let (line, raw) = tokens
            .next()
            .ok_or_else(|| FtError::parse(origin, 0, format!("节点列表提前结束: 期望 {count} 个")))?;
        let id: usize = raw
            .parse()
            .map_err(|_| FtError::parse(origin, line, format!("无法解析节点编号: `{raw}`")))?;
        if id == 0 {
            return Err(FtError::parse(origin, line, "节点编号为 1 基, 不允许 0"));
        }
        nodes.push((id - 1) as u32);
    }

    debug!(n_nodes = nodes.len(), file = %origin.display(), "边界区读取完成");
    Ok(nodes)
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_zone() {
        let content = "\
zone
00001  boundary_left_w
nnum
  12
  1 2 3 4 5 6 7 8 9 10
  11 12
";
        let nodes = parse_zone_string(content, "left.zone").unwrap();
        assert_eq!(nodes.len(), 12);
        assert_eq!(nodes[0], 0);
        assert_eq!(nodes[11], 11);
    }

    #[test]
    fn test_short_list_single_line() {
        let content = "zone\n1 out\nnnum\n3\n5 6 7\n";
        let nodes = parse_zone_string(content, "out.zone").unwrap();
        assert_eq!(nodes, vec![4, 5, 6]);
    }

    #[test]
    fn test_missing_nnum_rejected() {
        assert!(parse_zone_string("zone\n1 x\n3\n1 2 3\n", "bad.zone").is_err());
    }

    #[test]
    fn test_truncated_list_rejected() {
        let content = "zone\n1 x\nnnum\n5\n1 2 3\n";
        assert!(parse_zone_string(content, "bad.zone").is_err());
    }

    #[test]
    fn test_zero_id_rejected() {
        let content = "zone\n1 x\nnnum\n2\n0 1\n";
        assert!(parse_zone_string(content, "bad.zone").is_err());
    }
}
