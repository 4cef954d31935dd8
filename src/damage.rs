use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 一次损伤分析的结果
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DamageResult {
    pub damage_detected: bool,
    /// 前后图片的相似度，范围 0 到 1
    pub similarity_score: f64,
    /// 损伤面积占比，范围 0 到 100
    pub damage_percentage: f64,
    pub damage_count: u32,
    /// 损伤类型，例如 `scratch`、`dent`、`paint_damage`
    pub damage_types: Vec<String>,
    /// `minor`、`moderate`、`major` 或者其他未知值
    pub severity: String,
    pub message: String,
    /// 设置时覆盖正常的渲染结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 后端响应不符合预期结构
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed response body: {0}")]
    Malformed(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("damage_types[{0}] is empty")]
    EmptyDamageType(usize),
}

/// 后端返回的原始结构，所有字段都可能缺失
#[derive(Debug, Deserialize)]
struct WireDamageResult {
    damage_detected: Option<bool>,
    similarity_score: Option<f64>,
    damage_percentage: Option<f64>,
    damage_count: Option<u32>,
    damage_types: Option<Vec<String>>,
    severity: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl DamageResult {
    /// 解析并校验后端的 JSON 响应
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        let wire: WireDamageResult =
            serde_json::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        wire.into_result()
    }
}

impl WireDamageResult {
    fn into_result(self) -> Result<DamageResult, ValidationError> {
        // 错误响应只带 damage_detected、error、message 三个字段
        if let Some(error) = self.error {
            return Ok(DamageResult {
                damage_detected: self.damage_detected.unwrap_or_default(),
                similarity_score: self.similarity_score.unwrap_or_default(),
                damage_percentage: self.damage_percentage.unwrap_or_default(),
                damage_count: self.damage_count.unwrap_or_default(),
                damage_types: self.damage_types.unwrap_or_default(),
                severity: self.severity.unwrap_or_default(),
                message: self.message.unwrap_or_default(),
                error: Some(error),
            });
        }

        let similarity_score = self.similarity_score.ok_or(ValidationError::MissingField("similarity_score"))?;
        check_range("similarity_score", similarity_score, 1.0)?;
        let damage_percentage =
            self.damage_percentage.ok_or(ValidationError::MissingField("damage_percentage"))?;
        check_range("damage_percentage", damage_percentage, 100.0)?;

        let damage_types = self.damage_types.ok_or(ValidationError::MissingField("damage_types"))?;
        if let Some(i) = damage_types.iter().position(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyDamageType(i));
        }

        Ok(DamageResult {
            damage_detected: self.damage_detected.ok_or(ValidationError::MissingField("damage_detected"))?,
            similarity_score,
            damage_percentage,
            damage_count: self.damage_count.ok_or(ValidationError::MissingField("damage_count"))?,
            damage_types,
            severity: self.severity.ok_or(ValidationError::MissingField("severity"))?,
            message: self.message.ok_or(ValidationError::MissingField("message"))?,
            error: None,
        })
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const OK_BODY: &str = r#"{
        "damage_detected": true,
        "similarity_score": 0.8123,
        "damage_percentage": 3.45,
        "damage_count": 3,
        "damage_types": ["scratch", "dent", "scratch"],
        "severity": "moderate",
        "message": "Damage detected! Moderate damage found (3.5% of image)."
    }"#;

    #[test]
    fn test_parse_full_result() {
        let result = DamageResult::from_json(OK_BODY).unwrap();
        assert!(result.damage_detected);
        assert_eq!(result.damage_count, 3);
        assert_eq!(result.damage_types, ["scratch", "dent", "scratch"]);
        assert_eq!(result.severity, "moderate");
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{
            "damage_detected": false,
            "error": "Failed to process images: bad shape",
            "message": "Error occurred during image processing"
        }"#;
        let result = DamageResult::from_json(body).unwrap();
        assert_eq!(result.error.as_deref(), Some("Failed to process images: bad shape"));
        assert_eq!(result.damage_count, 0);
        assert!(result.damage_types.is_empty());
    }

    #[test]
    fn test_missing_field() {
        let body = r#"{"damage_detected": false, "similarity_score": 0.9, "damage_percentage": 0.0}"#;
        assert_eq!(
            DamageResult::from_json(body),
            Err(ValidationError::MissingField("damage_types"))
        );
    }

    #[test]
    fn test_out_of_range() {
        let body = OK_BODY.replace("0.8123", "1.5");
        assert_matches!(
            DamageResult::from_json(&body),
            Err(ValidationError::OutOfRange { field: "similarity_score", .. })
        );

        let body = OK_BODY.replace("3.45", "-0.1");
        assert_matches!(
            DamageResult::from_json(&body),
            Err(ValidationError::OutOfRange { field: "damage_percentage", .. })
        );
    }

    #[test]
    fn test_empty_damage_type() {
        let body = OK_BODY.replace(r#""dent""#, r#""  ""#);
        assert_eq!(DamageResult::from_json(&body), Err(ValidationError::EmptyDamageType(1)));
    }

    #[test]
    fn test_malformed() {
        assert_matches!(DamageResult::from_json("Internal Server Error"), Err(ValidationError::Malformed(_)));
        assert_matches!(
            DamageResult::from_json(r#"{"damage_count": -1, "error": "x"}"#),
            Err(ValidationError::Malformed(_))
        );
    }
}
