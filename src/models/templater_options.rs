use std::convert::Infallible;
use std::str::FromStr;

/// Runtime environment the engine is deployed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    /// `prod`, `production`, `PROD-eu` ... 都视为生产环境，其它一律为开发环境
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("prod")) {
            Ok(Environment::Production)
        } else {
            Ok(Environment::Development)
        }
    }
}

pub struct TemplaterOptions {
    pub cached: Option<bool>,         // 未设置时跟随 environment
    pub environment: Environment,     // 决定错误展示方式
    pub artifact_dir: String,         // 编译产物目录，相对模板根目录
    pub check_modified: bool,         // 命中缓存时校验源文件修改时间
}

impl Default for TemplaterOptions {
    fn default() -> Self {
        TemplaterOptions {
            cached: None,
            environment: Environment::default(),
            artifact_dir: ".tmp".to_string(),
            check_modified: false,
        }
    }
}

impl TemplaterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn artifact_dir(mut self, artifact_dir: impl Into<String>) -> Self {
        self.artifact_dir = artifact_dir.into();
        self
    }

    pub fn check_modified(mut self, check_modified: bool) -> Self {
        self.check_modified = check_modified;
        self
    }

    /// Whether persisted artifacts are reused. Production implies cached
    /// mode unless set explicitly.
    pub fn is_cached(&self) -> bool {
        self.cached.unwrap_or(self.environment.is_production())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" PROD-eu ".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("pro".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("".parse::<Environment>().unwrap(), Environment::Development);
    }

    #[test]
    fn test_is_cached_follows_environment() {
        assert!(!TemplaterOptions::new().is_cached());
        assert!(TemplaterOptions::new().environment(Environment::Production).is_cached());
        assert!(!TemplaterOptions::new()
            .environment(Environment::Production)
            .cached(false)
            .is_cached());
        assert!(TemplaterOptions::new().cached(true).is_cached());
        assert_eq!(TemplaterOptions::new().artifact_dir, ".tmp");
    }
}
