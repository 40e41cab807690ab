use naga::front::glsl;
use naga::front::wgsl;
use naga::valid::{Capabilities, ModuleInfo, ValidationError, ValidationFlags, Validator};
use naga::{Module, ShaderStage, WithSpan};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SourceLanguage {
    Wgsl,
    Glsl,
}

impl SourceLanguage {
    /// Picks the front-end for a target profile string such as `"wgsl"` or
    /// `"glsl450"`.
    pub fn from_profile(profile: &str) -> Option<Self> {
        let profile = profile.to_ascii_lowercase();
        if profile == "wgsl" {
            Some(SourceLanguage::Wgsl)
        } else if profile.starts_with("glsl") {
            Some(SourceLanguage::Glsl)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub enum ShaderValidError {
    Parse(wgsl::ParseError),
    GlslParse(glsl::ParseErrors),
    ValidationError(WithSpan<ValidationError>),
}

impl ShaderValidError {
    pub fn emit_to_string(&self, source: &str) -> String {
        match self {
            ShaderValidError::Parse(e) => e.emit_to_string(source),
            ShaderValidError::GlslParse(e) => e.emit_to_string(source),
            ShaderValidError::ValidationError(e) => e.emit_to_string(source),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        !matches!(self, ShaderValidError::ValidationError(_))
    }
}

pub fn parse_source(
    language: SourceLanguage,
    stage: ShaderStage,
    source: &str,
) -> Result<Module, ShaderValidError> {
    match language {
        SourceLanguage::Wgsl => wgsl::parse_str(source).map_err(ShaderValidError::Parse),
        SourceLanguage::Glsl => glsl::Frontend::default()
            .parse(&glsl::Options::from(stage), source)
            .map_err(ShaderValidError::GlslParse),
    }
}

pub fn validate_module(module: &Module) -> Result<ModuleInfo, ShaderValidError> {
    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(module)
        .map_err(ShaderValidError::ValidationError)
}

/// Parses `source` with the front-end of `language` and validates the
/// resulting module.
pub fn check_source(
    language: SourceLanguage,
    stage: ShaderStage,
    source: &str,
) -> Result<(Module, ModuleInfo), ShaderValidError> {
    let module = parse_source(language, stage, source)?;
    let info = validate_module(&module)?;
    Ok((module, info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_select_front_ends() {
        assert_eq!(SourceLanguage::from_profile("wgsl"), Some(SourceLanguage::Wgsl));
        assert_eq!(SourceLanguage::from_profile("GLSL450"), Some(SourceLanguage::Glsl));
        assert_eq!(SourceLanguage::from_profile("vs_2_0"), None);
    }

    #[test]
    fn broken_wgsl_is_reported() {
        let err = check_source(SourceLanguage::Wgsl, ShaderStage::Vertex, "fn main( {")
            .unwrap_err();
        assert!(err.is_parse_error());
        assert!(!err.emit_to_string("fn main( {").is_empty());
    }

    #[test]
    fn valid_wgsl_keeps_its_entry_points() {
        let source = "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let (module, _) =
            check_source(SourceLanguage::Wgsl, ShaderStage::Fragment, source).unwrap();
        assert_eq!(module.entry_points.len(), 1);
        assert_eq!(module.entry_points[0].name, "main");
    }
}
