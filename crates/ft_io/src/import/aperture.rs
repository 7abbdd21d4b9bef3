// crates/ft_io/src/import/aperture.rs

//! 裂隙开度文件读取
//!
//! 每条裂隙一行，行内最后一列为开度值 [m]（行序即裂隙编号）。
//! 首行若不是数据（如 `aperture` 标题）则跳过。前置列（材料号
//! 等求解器专用字段）被忽略。

use ft_foundation::error::{FtError, FtResult};
use std::path::Path;
use tracing::debug;

/// 从文件读取每裂隙开度
pub fn load_aperture(path: &Path) -> FtResult<Vec<f64>> {
    if !path.is_file() {
        return Err(FtError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    parse_aperture_string(&content, path)
}

/// 从字符串解析每裂隙开度
pub fn parse_aperture_string(content: &str, origin: impl AsRef<Path>) -> FtResult<Vec<f64>> {
    let origin = origin.as_ref();
    let mut apertures = Vec::new();
    let mut first_data_seen = false;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let no = i + 1;
        let last = match line.split_whitespace().next_back() {
            Some(t) => t,
            None => continue,
        };
        let value: f64 = match last.parse() {
            Ok(v) => v,
            Err(_) if !first_data_seen => continue, // 标题行
            Err(_) => {
                return Err(FtError::parse(
                    origin,
                    no,
                    format!("无法解析开度: `{last}`"),
                ));
            }
        };
        first_data_seen = true;
        if !(value > 0.0) || !value.is_finite() {
            return Err(FtError::parse(origin, no, format!("开度必须为正: {value}")));
        }
        apertures.push(value);
    }

    if apertures.is_empty() {
        return Err(FtError::invalid_input(format!(
            "{}: 开度文件无有效数据",
            origin.display()
        )));
    }
    debug!(n_fractures = apertures.len(), file = %origin.display(), "开度读取完成");
    Ok(apertures)
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header_and_leading_columns() {
        let content = "aperture\n-7 0 0 1.0e-4\n-8 0 0 2.0e-4\n";
        let apertures = parse_aperture_string(content, "aperture.dat").unwrap();
        assert_eq!(apertures.len(), 2);
        assert!((apertures[0] - 1.0e-4).abs() < 1e-18);
        assert!((apertures[1] - 2.0e-4).abs() < 1e-18);
    }

    #[test]
    fn test_parse_bare_values() {
        let apertures = parse_aperture_string("1e-4\n1e-4\n3e-4\n", "a.dat").unwrap();
        assert_eq!(apertures, vec![1e-4, 1e-4, 3e-4]);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(parse_aperture_string("-1e-4\n", "a.dat").is_err());
    }

    #[test]
    fn test_garbage_after_data_rejected() {
        assert!(parse_aperture_string("1e-4\nabc\n", "a.dat").is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(parse_aperture_string("aperture\n", "a.dat").is_err());
    }
}
