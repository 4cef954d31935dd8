//! 将 [`DamageResult`] 转换为可展示的报告
//!
//! 所有函数都是纯函数，未知的严重程度和损伤类型会得到默认的展示方式。

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::damage::DamageResult;

/// 严重程度对应的颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Yellow,
    Orange,
    Red,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityPresentation {
    pub color: Tone,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageTypePresentation {
    pub icon: &'static str,
    pub label: String,
}

pub fn severity_presentation(severity: &str) -> SeverityPresentation {
    let (color, icon) = match severity.to_lowercase().as_str() {
        "minor" => (Tone::Yellow, "⚠️"),
        "moderate" => (Tone::Orange, "🚨"),
        "major" => (Tone::Red, "💥"),
        _ => (Tone::Gray, "ℹ️"),
    };
    SeverityPresentation { color, icon }
}

pub fn damage_type_presentation(damage_type: &str) -> DamageTypePresentation {
    let icon = match damage_type.to_lowercase().as_str() {
        "scratch" => "🔪",
        "dent" => "🔨",
        "paint_damage" => "🎨",
        _ => "❓",
    };
    DamageTypePresentation { icon, label: humanize(damage_type) }
}

/// `paint_damage` -> `Paint Damage`
fn humanize(s: &str) -> String {
    s.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 仅将首字母大写，`major` -> `Major`
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub detected: bool,
    pub icon: &'static str,
    pub title: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityBadge {
    pub label: String,
    #[serde(flatten)]
    pub presentation: SeverityPresentation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageDetails {
    pub severity: SeverityBadge,
    pub damage_types: Vec<DamageTypePresentation>,
    /// 例如 `2 area(s) affected`
    pub damage_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullReport {
    pub banner: Banner,
    /// 百分比形式，保留一位小数
    pub similarity: String,
    /// 百分比形式，保留一位小数
    pub damage_area: String,
    /// 仅在检测到损伤时存在
    pub details: Option<DamageDetails>,
    pub summary: String,
}

/// 渲染后的报告
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum RenderedReport {
    Error { message: String },
    Full(FullReport),
}

/// 渲染一个分析结果，`error` 字段优先于其他所有字段
pub fn render(result: &DamageResult) -> RenderedReport {
    if let Some(error) = &result.error {
        return RenderedReport::Error { message: error.clone() };
    }

    let banner = if result.damage_detected {
        Banner { detected: true, icon: "🚨", title: "Damage Detected", message: result.message.clone() }
    } else {
        Banner { detected: false, icon: "✅", title: "No Damage Found", message: result.message.clone() }
    };

    let details = result.damage_detected.then(|| {
        let mut seen = HashSet::new();
        let damage_types = result
            .damage_types
            .iter()
            .filter(|t| seen.insert(t.to_lowercase()))
            .map(|t| damage_type_presentation(t))
            .collect();
        DamageDetails {
            severity: SeverityBadge {
                label: format!("{} Severity", capitalize(&result.severity)),
                presentation: severity_presentation(&result.severity),
            },
            damage_types,
            damage_count: format!("{} area(s) affected", result.damage_count),
        }
    });

    RenderedReport::Full(FullReport {
        banner,
        similarity: format!("{:.1}%", result.similarity_score * 100.0),
        damage_area: format!("{:.1}%", result.damage_percentage),
        details,
        summary: result.message.clone(),
    })
}

impl fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Results")?;
        let report = match self {
            Self::Error { message } => {
                writeln!(f, "Error occurred during analysis:")?;
                return writeln!(f, "{message}");
            }
            Self::Full(report) => report,
        };

        writeln!(f, "{} {}", report.banner.icon, report.banner.title)?;
        writeln!(f, "{}", report.banner.message)?;
        writeln!(f)?;
        writeln!(f, "Similarity Score\t{}", report.similarity)?;
        writeln!(f, "Damage Area\t{}", report.damage_area)?;

        if let Some(details) = &report.details {
            writeln!(f)?;
            writeln!(f, "Damage Details")?;
            writeln!(f, "{} {}", details.severity.presentation.icon, details.severity.label)?;
            if !details.damage_types.is_empty() {
                let badges: Vec<_> =
                    details.damage_types.iter().map(|t| format!("{} {}", t.icon, t.label)).collect();
                writeln!(f, "Types of Damage: {}", badges.join(", "))?;
            }
            writeln!(f, "Damage Count: {}", details.damage_count)?;
        }

        writeln!(f)?;
        writeln!(f, "Summary")?;
        writeln!(f, "{}", report.summary)
    }
}
