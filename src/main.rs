// ==========================================
// 洗涤分线排程系统 - 命令行主入口
// ==========================================
// 用法:
//   laundry-line-balance [--db PATH] [--locale zh-CN|en] <命令> [参数...]
//
// 命令:
//   day <YYYY-MM-DD>                       单日均衡报表
//   range <FROM> <TO>                      区间均衡报表（闭区间）
//   products <YYYY-MM-DD>                  当日产品分类汇总
//   preview <产品名>...                     分类预览
//   override-set <产品名> <MANGLE|DOBLADO>  新增/更新人工覆写
//   override-delete <产品名>                删除人工覆写
//   overrides                              列出人工覆写
//   config-set <键> <值>                    更新配置项
//   config                                 配置快照
//   dates                                  存在记录的业务日期
//
// 结果以 JSON 输出到 stdout, 日志输出到 stderr
// ==========================================

use chrono::NaiveDate;
use laundry_line_balance::app::{get_default_db_path, AppState};
use laundry_line_balance::{i18n, logging, Line};
use serde::Serialize;

const USAGE: &str = "用法: laundry-line-balance [--db PATH] [--locale zh-CN|en] \
<day|range|products|preview|override-set|override-delete|overrides|config-set|config|dates> [参数...]";

/// 子命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Day,
    Range,
    Products,
    Preview,
    OverrideSet,
    OverrideDelete,
    Overrides,
    ConfigSet,
    Config,
    Dates,
}

impl Command {
    /// 解析子命令; 缺失或未知时返回带用法说明的错误
    fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw {
            Some("day") => Ok(Command::Day),
            Some("range") => Ok(Command::Range),
            Some("products") => Ok(Command::Products),
            Some("preview") => Ok(Command::Preview),
            Some("override-set") => Ok(Command::OverrideSet),
            Some("override-delete") => Ok(Command::OverrideDelete),
            Some("overrides") => Ok(Command::Overrides),
            Some("config-set") => Ok(Command::ConfigSet),
            Some("config") => Ok(Command::Config),
            Some("dates") => Ok(Command::Dates),
            Some(other) => Err(format!("未知命令: {}\n{}", other, USAGE)),
            None => Err(format!("缺少命令\n{}", USAGE)),
        }
    }
}

fn parse_date(raw: Option<&String>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let raw = raw.ok_or("缺少日期参数（YYYY-MM-DD）")?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("日期格式错误（应为 YYYY-MM-DD）: {}", raw).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_config_snapshot(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| e.to_string())?;
    println!("{}", snapshot);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    // 解析全局参数
    let mut db_path: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_path = Some(args.next().ok_or("--db 缺少路径参数")?),
            "--locale" => {
                let locale = args.next().ok_or("--locale 缺少语言参数")?;
                if !i18n::set_locale(&locale) {
                    return Err(format!("不支持的语言: {}", locale).into());
                }
            }
            _ => positional.push(arg),
        }
    }

    // 先校验命令, 未知命令不打开数据库
    let command = Command::parse(positional.first().map(String::as_str))?;
    let rest = &positional[1..];

    let db_path = db_path.unwrap_or_else(get_default_db_path);
    tracing::info!(
        app = laundry_line_balance::APP_NAME,
        version = laundry_line_balance::VERSION,
        db_path = %db_path,
        "启动"
    );

    let state = AppState::new(db_path)?;
    let api = state.balance_api.clone();

    match command {
        Command::Day => {
            let date = parse_date(rest.first())?;
            print_json(&api.analyze_day(date).await?)?;
        }
        Command::Range => {
            let from = parse_date(rest.first())?;
            let to = parse_date(rest.get(1))?;
            print_json(&api.analyze_range(from, to).await?)?;
        }
        Command::Products => {
            let date = parse_date(rest.first())?;
            print_json(&api.list_day_products(date).await?)?;
        }
        Command::Preview => {
            print_json(&api.preview_classification(rest).await?)?;
        }
        Command::OverrideSet => {
            let product = rest.first().ok_or("缺少产品名")?;
            let raw_line = rest.get(1).ok_or("缺少处理线（MANGLE/DOBLADO）")?;
            let line = Line::parse(raw_line)
                .ok_or_else(|| format!("无法识别的处理线: {}", raw_line))?;
            print_json(&api.upsert_override(product, line)?)?;
        }
        Command::OverrideDelete => {
            let product = rest.first().ok_or("缺少产品名")?;
            api.delete_override(product)?;
            print_json(&serde_json::json!({ "deleted": product }))?;
        }
        Command::Overrides => {
            print_json(&api.list_overrides()?)?;
        }
        Command::ConfigSet => {
            let key = rest.first().ok_or("缺少配置键")?;
            let value = rest.get(1).ok_or("缺少配置值")?;
            api.set_config_value(key, value)?;
            print_config_snapshot(&state)?;
        }
        Command::Config => {
            print_config_snapshot(&state)?;
        }
        Command::Dates => {
            print_json(&api.list_business_dates()?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse(Some("day")), Ok(Command::Day));
        assert_eq!(Command::parse(Some("override-delete")), Ok(Command::OverrideDelete));
        assert_eq!(Command::parse(Some("dates")), Ok(Command::Dates));
    }

    #[test]
    fn test_unknown_or_missing_command_is_error() {
        let err = Command::parse(Some("balance")).unwrap_err();
        assert!(err.contains("balance"));
        assert!(err.contains("用法"));
        assert!(Command::parse(None).is_err());
    }
}
