//! MTL (Material Template Library) file parser
//!
//! Reads the Phong color terms of Wavefront .mtl files. Texture maps and
//! illumination models are ignored.

use std::collections::HashMap;

use super::model::Material;
use super::ImportError;
use crate::foundation::math::Vec4;

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL text into materials keyed by name
    pub fn parse(content: &str) -> Result<HashMap<String, Material>, ImportError> {
        let mut materials = HashMap::new();
        let mut current: Option<Material> = None;

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };

            if keyword == "newmtl" {
                if let Some(material) = current.take() {
                    materials.insert(material.name.clone(), material);
                }
                let name = tokens.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(ImportError::Parse {
                        line: line_num + 1,
                        message: "newmtl missing material name".to_string(),
                    });
                }
                current = Some(Material::new(name));
                continue;
            }

            let Some(material) = current.as_mut() else {
                log::debug!("MTL line {}: '{}' before any newmtl, ignored", line_num + 1, keyword);
                continue;
            };

            match keyword {
                "Ka" => material.ambient = parse_color(&mut tokens, line_num, keyword)?,
                "Kd" => {
                    let alpha = material.diffuse.w;
                    material.diffuse = parse_color(&mut tokens, line_num, keyword)?;
                    material.diffuse.w = alpha;
                }
                "Ks" => material.specular = parse_color(&mut tokens, line_num, keyword)?,
                "Ke" => material.emissive = parse_color(&mut tokens, line_num, keyword)?,
                "Ns" => material.shininess = parse_f32(&mut tokens, line_num, keyword)?,
                "d" => material.diffuse.w = parse_f32(&mut tokens, line_num, keyword)?.clamp(0.0, 1.0),
                "Tr" => material.diffuse.w = (1.0 - parse_f32(&mut tokens, line_num, keyword)?).clamp(0.0, 1.0),
                _ => {}
            }
        }

        if let Some(material) = current {
            materials.insert(material.name.clone(), material);
        }
        Ok(materials)
    }
}

fn parse_f32<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_num: usize, keyword: &str) -> Result<f32, ImportError> {
    tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ImportError::Parse {
            line: line_num + 1,
            message: format!("invalid {} value", keyword),
        })
}

fn parse_color<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_num: usize, keyword: &str) -> Result<Vec4, ImportError> {
    let r = parse_f32(tokens, line_num, keyword)?;
    let g = parse_f32(tokens, line_num, keyword)?;
    let b = parse_f32(tokens, line_num, keyword)?;
    Ok(Vec4::new(r, g, b, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_materials() {
        let content = "
# exported
newmtl Porcelain
Kd 0.9 0.9 0.85
Ns 96.0
d 0.5

newmtl Gold
Kd 1.0 0.8 0.2
Ke 0.1 0.1 0.0
";
        let materials = MtlParser::parse(content).unwrap();
        assert_eq!(materials.len(), 2);

        let porcelain = &materials["Porcelain"];
        assert_eq!(porcelain.diffuse, Vec4::new(0.9, 0.9, 0.85, 0.5));
        assert_eq!(porcelain.shininess, 96.0);

        let gold = &materials["Gold"];
        assert_eq!(gold.emissive, Vec4::new(0.1, 0.1, 0.0, 1.0));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let err = MtlParser::parse("newmtl A\nKd 1.0 nope 0.0\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse { line: 2, .. }));
    }
}
