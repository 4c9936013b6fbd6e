// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
///
/// # 返回
/// 不支持的语言返回 false 且保持当前语言
pub fn set_locale(locale: &str) -> bool {
    let locale = locale.trim();
    if !SUPPORTED_LOCALES.contains(&locale) {
        tracing::warn!(locale = %locale, "不支持的语言，保持当前设置");
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use laundry_line_balance::i18n::t;
/// let msg = t("schedule_reason.seed_selection");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use laundry_line_balance::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/day.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Line, ScheduleReason};
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert!(set_locale("zh-CN"));
        assert_eq!(current_locale(), "zh-CN");

        assert!(set_locale("en"));
        assert_eq!(current_locale(), "en");

        // 不支持的语言不生效
        assert!(!set_locale("fr"));
        assert_eq!(current_locale(), "en");

        set_locale("zh-CN");
    }

    #[test]
    fn test_reason_and_line_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(ScheduleReason::SeedSelection.label(), "首个排程客户");
        assert_eq!(Line::Mangle.label(), "平烫线");

        set_locale("en");
        assert_eq!(ScheduleReason::HighVolumeClient.label(), "High-volume client");
        assert_eq!(Line::Doblado.label(), "Folding line");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/day.csv")]);
        assert!(msg.contains("/tmp/day.csv"));
        assert!(msg.contains("文件不存在"));

        set_locale("en");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/day.csv")]);
        assert!(msg.contains("File not found"));

        set_locale("zh-CN");
    }
}
