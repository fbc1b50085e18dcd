use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Path value marking a table-of-contents group label rather than a page.
pub const GROUP_SENTINEL: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub path: String,
}

impl Entry {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Entry {
            title: title.into(),
            path: path.into(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.path == GROUP_SENTINEL
    }
}

/// Vue 3 guide, in sidebar order. Group labels use `GROUP_SENTINEL` as path.
const VUE_GUIDE: &[(&str, &str)] = &[
    ("开始", "#"),
    ("介绍", "/guide/introduction.html"),
    ("快速开始", "/guide/quick-start.html"),
    ("基础", "#"),
    ("创建一个应用", "/guide/essentials/application.html"),
    ("模板语法", "/guide/essentials/template-syntax.html"),
    ("响应性基础", "/guide/essentials/reactivity-fundamentals.html"),
    ("计算属性", "/guide/essentials/computed.html"),
    ("类和样式绑定", "/guide/essentials/class-and-style.html"),
    ("条件渲染", "/guide/essentials/conditional.html"),
    ("列表渲染", "/guide/essentials/list.html"),
    ("事件处理", "/guide/essentials/event-handling.html"),
    ("表单输入绑定", "/guide/essentials/forms.html"),
    ("侦听器", "/guide/essentials/watchers.html"),
    ("模板引用", "/guide/template-refs.html"),
    ("组件基础", "/guide/essentials/component-basics.html"),
    ("生命周期", "/guide/essentials/lifecycle.html"),
    ("深入组件", "#"),
    ("注册", "/guide/components/registration.html"),
    ("Props", "/guide/components/props.html"),
    ("事件", "/guide/components/events.html"),
    ("组件 v-model", "/guide/components/v-model.html"),
    ("透传 Attributes", "/guide/components/attrs.html"),
    ("插槽", "/guide/components/slots.html"),
    ("依赖注入", "/guide/components/provide-inject.html"),
    ("异步组件", "/guide/components/async-components.html"),
    ("内置组件", "#"),
    ("Transition", "/guide/built-ins/transition.html"),
    ("TransitionGroup", "/guide/built-ins/transition-group.html"),
    ("KeepAlive", "/guide/built-ins/keep-alive.html"),
    ("Teleport", "/guide/built-ins/teleport.html"),
    ("Suspense", "/guide/built-ins/suspense.html"),
    ("逻辑复用", "#"),
    ("组合式函数", "/guide/reusability/composables.html"),
    ("自定义指令", "/guide/reusability/custom-directives.html"),
    ("插件", "/guide/reusability/plugins.html"),
    ("应用规模化", "#"),
    ("单文件组件", "/guide/scaling-up/sfc.html"),
    ("工具链", "/guide/scaling-up/tooling.html"),
    ("路由", "/guide/scaling-up/routing.html"),
    ("状态管理", "/guide/scaling-up/state-management.html"),
    ("测试", "/guide/scaling-up/testing.html"),
    ("服务端渲染 (SSR)", "/guide/scaling-up/ssr.html"),
    ("最佳实践", "#"),
    ("生产部署", "/guide/best-practices/production-deployment.html"),
    ("性能优化", "/guide/best-practices/performance.html"),
    ("安全最佳实践", "/guide/best-practices/security.html"),
    ("无障碍访问", "/guide/best-practices/accessibility.html"),
    ("TypeScript", "#"),
    ("TypeScript 总览", "/guide/typescript/overview.html"),
    ("TypeScript 与选项式 API", "/guide/typescript/options-api.html"),
    ("TypeScript 与组合式 API", "/guide/typescript/composition-api.html"),
    ("进阶主题", "#"),
    ("使用 Vue 的多种方式", "/guide/extras/ways-of-using-vue.html"),
    ("组合式 API 常见问答", "/guide/extras/composition-api-faq.html"),
    ("深入响应式系统", "/guide/extras/reactivity-in-depth.html"),
    ("渲染机制", "/guide/extras/rendering-mechanism.html"),
    ("渲染函数 & JSX", "/guide/extras/render-function.html"),
    ("Vue 与 Web Components", "/guide/extras/web-components.html"),
    ("动画技巧", "/guide/extras/animation.html"),
];

/// The built-in catalog.
pub fn builtin() -> Vec<Entry> {
    VUE_GUIDE
        .iter()
        .map(|(title, path)| Entry::new(*title, *path))
        .collect()
}

/// Load a catalog from a JSON array of `{"title", "path"}` objects.
pub fn load(path: &Path) -> Result<Vec<Entry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid catalog JSON in {}", path.display()))?;
    validate(&entries)?;
    Ok(entries)
}

fn validate(entries: &[Entry]) -> Result<()> {
    if entries.is_empty() {
        bail!("Catalog is empty");
    }
    for (i, e) in entries.iter().enumerate() {
        if e.title.trim().is_empty() {
            bail!("Catalog entry {} has an empty title", i);
        }
        if e.path.trim().is_empty() {
            bail!("Catalog entry {} ({}) has an empty path", i, e.title);
        }
    }
    Ok(())
}

/// Number of entries that will actually be fetched.
pub fn page_count(entries: &[Entry]) -> usize {
    entries.iter().filter(|e| !e.is_group()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_starts_with_group() {
        let entries = builtin();
        assert_eq!(entries.len(), VUE_GUIDE.len());
        assert!(entries[0].is_group());
        assert!(!entries[1].is_group());
        assert!(entries[1].path.starts_with('/'));
    }

    #[test]
    fn builtin_paths_are_valid() {
        assert!(validate(&builtin()).is_ok());
        let pages = page_count(&builtin());
        assert!(pages > 0 && pages < VUE_GUIDE.len());
    }

    #[test]
    fn load_json_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"[{{"title": "Intro", "path": "#"}}, {{"title": "Page A", "path": "/a"}}]"##
        )
        .unwrap();
        let entries = load(file.path()).unwrap();
        assert_eq!(entries, vec![Entry::new("Intro", "#"), Entry::new("Page A", "/a")]);
    }

    #[test]
    fn load_rejects_empty_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"title": "Page A", "path": " "}}]"#).unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty path"));
    }

    #[test]
    fn load_rejects_empty_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(load(file.path()).is_err());
    }
}
