//! Built-in Playwright test templates
//!
//! One TypeScript template per [`TemplateId`], written in the crate's template
//! language. Step and assertion text is carried into the output as numbered
//! comments next to generic, selector-light Playwright code.

use serde_json::{json, Value};
use std::collections::HashMap;

use screentest_common::{ScreenSpec, TemplateId, TestCase};

use crate::error::SyntaxError;
use crate::render::{RenderContext, Template};

macro_rules! playwright_test {
    ($body:literal) => {
        concat!(
            "import { test, expect } from '@playwright/test';\n",
            "\n",
            "test.describe('{{screen}}', () => {\n",
            "  test('{{testName}}{{#if tag}} {{tag}}{{/if}}', async ({ page }) => {\n",
            "{{#if description}}    // {{description}}\n{{/if}}",
            $body,
            "\n",
            "    await page.screenshot({ path: 'test-results/{{kebabCase screen}}-{{kebabCase testName}}.png' });\n",
            "  });\n",
            "});\n"
        )
    };
}

const FORM_SUBMISSION: &str = playwright_test!(
    "{{#if route}}    await page.goto('{{route}}');
{{/if}}    const form = page.locator('form').first();
    await expect(form).toBeVisible();

{{#each steps}}    // Step {{number}}: {{text}}
{{/each}}    const inputs = form.locator('input:not([type=\"hidden\"]):not([type=\"submit\"]), textarea');
    const count = await inputs.count();
    for (let i = 0; i < count; i++) {
      const input = inputs.nth(i);
      if (await input.isEditable()) {
        await input.fill(`value-${i + 1}`);
      }
    }
    await form.locator('[type=\"submit\"], button:not([type])').first().click();

{{#each assertions}}    // Expect {{number}}: {{text}}
{{/each}}    await expect(page.locator('[aria-invalid=\"true\"]')).toHaveCount(0);
"
);

const NAVIGATION: &str = playwright_test!(
    "{{#if route}}    await page.goto('{{route}}');
{{/if}}{{#unless route}}    await page.goto('/');
{{/unless}}    await page.waitForLoadState('domcontentloaded');
    const startUrl = page.url();

{{#each steps}}    // Step {{number}}: {{text}}
{{/each}}    const link = page.getByRole('link').first();
    await expect(link).toBeVisible();
    await link.click();
    await page.waitForLoadState('domcontentloaded');

{{#each assertions}}    // Expect {{number}}: {{text}}
{{/each}}    expect(page.url()).not.toBe(startUrl);
    await expect(page.locator('body')).toBeVisible();
"
);

const MODAL_DIALOG: &str = playwright_test!(
    "{{#if route}}    await page.goto('{{route}}');
{{/if}}
{{#each steps}}    // Step {{number}}: {{text}}
{{/each}}    await page.getByRole('button').first().click();
    const dialog = page.getByRole('dialog');
    await expect(dialog).toBeVisible();

{{#each assertions}}    // Expect {{number}}: {{text}}
{{/each}}    await page.keyboard.press('Escape');
    await expect(dialog).toBeHidden();
"
);

const LIST_FILTER: &str = playwright_test!(
    "{{#if route}}    await page.goto('{{route}}');
{{/if}}    const items = page.locator('[role=\"listitem\"], li, tbody tr');
{{#if skipIfEmpty}}    test.skip((await items.count()) === 0, 'No items to filter');
{{/if}}
{{#each steps}}    // Step {{number}}: {{text}}
{{/each}}    const before = await items.count();
    const search = page.getByRole('searchbox').or(page.getByPlaceholder(/search|filter/i)).first();
    await search.fill('a');
    await page.waitForLoadState('networkidle');

{{#each assertions}}    // Expect {{number}}: {{text}}
{{/each}}    expect(await items.count()).toBeLessThanOrEqual(before);
"
);

const AUTH_FLOW: &str = playwright_test!(
    "{{#if route}}    await page.goto('{{route}}');
{{/if}}{{#unless route}}    await page.goto('/login');
{{/unless}}
{{#each steps}}    // Step {{number}}: {{text}}
{{/each}}    await page.getByLabel(/email|username/i).fill(process.env.E2E_USER_EMAIL ?? 'user@example.com');
    await page.getByLabel(/password/i).fill(process.env.E2E_USER_PASSWORD ?? 'password');
    await page.getByRole('button', { name: /log in|sign in/i }).click();

{{#each assertions}}    // Expect {{number}}: {{text}}
{{/each}}    await expect(page).not.toHaveURL(/login/);
"
);

/// Template source for an identifier
pub fn source(id: TemplateId) -> &'static str {
    match id {
        TemplateId::FormSubmission => FORM_SUBMISSION,
        TemplateId::Navigation => NAVIGATION,
        TemplateId::ModalDialog => MODAL_DIALOG,
        TemplateId::ListFilter => LIST_FILTER,
        TemplateId::AuthFlow => AUTH_FLOW,
    }
}

/// Every built-in template, compiled once
#[derive(Debug, Clone)]
pub struct BuiltinTemplates {
    compiled: HashMap<TemplateId, Template>,
}

impl BuiltinTemplates {
    /// Compile all built-in templates, surfacing any syntax error up front
    pub fn compile() -> Result<Self, SyntaxError> {
        let mut compiled = HashMap::new();
        for id in TemplateId::ALL {
            compiled.insert(id, Template::compile(source(id))?);
        }
        Ok(Self { compiled })
    }

    /// Render the test case with the given template
    pub fn render(&self, id: TemplateId, spec: &ScreenSpec, test: &TestCase) -> String {
        let context = build_context(spec, test);
        match self.compiled.get(&id) {
            Some(template) => template.render(&context),
            // compile() inserts every identifier
            None => String::new(),
        }
    }
}

/// Bindings exposed to the built-in templates
pub fn build_context(spec: &ScreenSpec, test: &TestCase) -> RenderContext {
    let numbered = |items: &[String]| -> Value {
        Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, text)| json!({ "number": i + 1, "text": comment_text(text) }))
                .collect(),
        )
    };

    let mut context = RenderContext::new()
        .with("screen", js_string(&spec.screen))
        .with("screenDescription", comment_text(&spec.description))
        .with("testName", js_string(&test.name))
        .with("description", comment_text(&test.description))
        .with("steps", numbered(&test.steps))
        .with("assertions", numbered(&test.assertions))
        .with("stepCount", test.steps.len())
        .with("assertionCount", test.assertions.len())
        .with("skipIfEmpty", test.skip_if_empty);

    if let Some(route) = &spec.route {
        context.insert("route", js_string(route));
    }
    if let Some(priority) = test.priority {
        context.insert("priority", priority.to_string());
        context.insert("tag", format!("@{}", priority));
    }
    context
}

/// Escape text for a single-quoted TypeScript string literal
pub fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Collapse text onto one line so it fits in a `//` comment
pub fn comment_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{extract_variables, validate_syntax};
    use screentest_common::Priority;

    fn spec(route: Option<&str>) -> ScreenSpec {
        ScreenSpec {
            screen: "Team Members".to_string(),
            description: "Members list".to_string(),
            route: route.map(String::from),
            tests: vec![],
        }
    }

    fn test_case() -> TestCase {
        TestCase {
            name: "filters by owner's name".to_string(),
            description: "Filter\nnarrows rows".to_string(),
            steps: vec!["type owner".to_string(), "wait for results".to_string()],
            assertions: vec!["only owners remain".to_string()],
            template_hint: None,
            priority: Some(Priority::Critical),
            skip_if_empty: true,
        }
    }

    #[test]
    fn test_every_builtin_template_is_valid() {
        for id in TemplateId::ALL {
            validate_syntax(source(id)).unwrap_or_else(|e| panic!("{}: {}", id, e));
        }
    }

    #[test]
    fn test_templates_only_reference_context_names() {
        let context = build_context(&spec(Some("/members")), &test_case());
        for id in TemplateId::ALL {
            for name in extract_variables(source(id)) {
                let known = context.get(&name).is_some() || name == "number" || name == "text";
                assert!(known, "{} references unknown name '{}'", id, name);
            }
        }
    }

    #[test]
    fn test_list_filter_renders_steps_skip_and_tag() {
        let templates = BuiltinTemplates::compile().unwrap();
        let code = templates.render(TemplateId::ListFilter, &spec(Some("/members")), &test_case());

        assert!(code.contains("test.describe('Team Members', () => {"));
        assert!(code.contains("test('filters by owner\\'s name @critical', async ({ page }) => {"));
        assert!(code.contains("    // Filter narrows rows\n"));
        assert!(code.contains("    await page.goto('/members');\n"));
        assert!(code.contains("    test.skip((await items.count()) === 0, 'No items to filter');\n"));
        assert!(code.contains("    // Step 1: type owner\n    // Step 2: wait for results\n"));
        assert!(code.contains("    // Expect 1: only owners remain\n"));
        assert!(code.contains("test-results/team-members-filters-by-owner-s-name.png"));
        assert!(!code.contains("{{"));
    }

    #[test]
    fn test_default_route_when_spec_has_none() {
        let templates = BuiltinTemplates::compile().unwrap();
        let mut case = test_case();
        case.priority = None;

        let code = templates.render(TemplateId::AuthFlow, &spec(None), &case);
        assert!(code.contains("await page.goto('/login');"));
        assert!(code.contains("test('filters by owner\\'s name', async"));

        let code = templates.render(TemplateId::FormSubmission, &spec(None), &case);
        assert!(!code.contains("page.goto"));
    }

    #[test]
    fn test_js_string_escapes_quotes_and_newlines() {
        assert_eq!(js_string("it's a\\b\nc\r"), "it\\'s a\\\\b\\nc");
        assert_eq!(comment_text("  a \n\t b "), "a b");
    }
}
