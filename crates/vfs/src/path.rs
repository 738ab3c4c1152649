//! 名称与卷地址解析
//!
//! 每个卷的名称空间是扁平的：条目名不含 `/`。门面使用 `卷:/名称` 形式的地址：
//!
//! - `disk0:/a.txt` 与 `disk0:a.txt` 等价
//! - 名称前导的 `/` 会被忽略，其余位置出现 `/` 视为无效

use crate::FsError;

/// 校验条目名
///
/// 名称必须非空，且不能包含 `/` 或 NUL，也不能是 `.` / `..`
pub fn validate_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FsError::InvalidArgument);
    }
    if name.bytes().any(|b| b == b'/' || b == 0) {
        return Err(FsError::InvalidArgument);
    }
    Ok(())
}

/// 去掉前导 `/` 并校验，返回卷内条目名
pub fn normalize_name(path: &str) -> Result<&str, FsError> {
    let name = path.trim_start_matches('/');
    validate_name(name)?;
    Ok(name)
}

/// 将 `卷:/名称` 拆分为卷名和卷内条目名
pub fn split_volume_path(path: &str) -> Result<(&str, &str), FsError> {
    let (volume, rest) = path.split_once(':').ok_or(FsError::InvalidArgument)?;
    if volume.is_empty() || volume.contains('/') {
        return Err(FsError::InvalidArgument);
    }
    Ok((volume, normalize_name(rest)?))
}
