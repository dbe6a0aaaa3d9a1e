//! Prompt construction for generated tests

use std::fmt::Write;

use screentest_common::TestCase;

const INSTRUCTIONS: &str = "You write Playwright end-to-end tests in TypeScript.
Produce one complete test file for the test case below.";

const OUTPUT_RULES: &str = "Output rules:
- Respond with TypeScript code only, inside a single ```typescript fenced block.
- Do not add explanations, notes or prose before or after the code.
- Import from '@playwright/test' and use test.describe with exactly one test.
- Prefer role, label and text locators over CSS selectors.
- Turn every assertion into at least one expect() call.";

/// Worked examples that anchor the expected style
pub const WORKED_EXAMPLES: [(&str, &str); 2] = [
    (
        "Name: shows validation error for empty email
Steps:
1. Open the signup page
2. Click the Create account button without filling anything
Assertions:
1. An error mentions that email is required",
        "```typescript
import { test, expect } from '@playwright/test';

test.describe('Signup', () => {
  test('shows validation error for empty email', async ({ page }) => {
    await page.goto('/signup');
    await page.getByRole('button', { name: 'Create account' }).click();
    await expect(page.getByText(/email is required/i)).toBeVisible();
  });
});
```",
    ),
    (
        "Name: paginates results
Steps:
1. Open the orders list
2. Click Next page
Assertions:
1. The page indicator shows page 2
2. A different first order is listed",
        "```typescript
import { test, expect } from '@playwright/test';

test.describe('Orders', () => {
  test('paginates results', async ({ page }) => {
    await page.goto('/orders');
    const firstRow = page.getByRole('row').nth(1);
    const before = await firstRow.textContent();
    await page.getByRole('button', { name: /next/i }).click();
    await expect(page.getByText(/page 2/i)).toBeVisible();
    await expect(firstRow).not.toHaveText(before ?? '');
  });
});
```",
    ),
];

/// Build the full prompt for a test case
pub fn build_prompt(test: &TestCase) -> String {
    let mut prompt = String::new();
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_RULES);
    prompt.push_str("\n\n");

    for (i, (input, output)) in WORKED_EXAMPLES.iter().enumerate() {
        let _ = writeln!(prompt, "Example {}:", i + 1);
        let _ = writeln!(prompt, "{}", input);
        let _ = writeln!(prompt, "{}\n", output);
    }

    prompt.push_str("Test case:\n");
    let _ = writeln!(prompt, "Name: {}", test.name);
    if !test.description.is_empty() {
        let _ = writeln!(prompt, "Description: {}", test.description);
    }
    prompt.push_str("Steps:\n");
    for (i, step) in test.steps.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, step);
    }
    prompt.push_str("Assertions:\n");
    for (i, assertion) in test.assertions.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, assertion);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> TestCase {
        TestCase {
            name: "archives a message".to_string(),
            description: "Archive from the toolbar".to_string(),
            steps: vec!["Select the first message".to_string(), "Click Archive".to_string()],
            assertions: vec!["The message leaves the inbox".to_string()],
            template_hint: None,
            priority: None,
            skip_if_empty: false,
        }
    }

    #[test]
    fn test_prompt_numbers_steps_and_assertions() {
        let prompt = build_prompt(&case());
        assert!(prompt.contains("Name: archives a message\n"));
        assert!(prompt.contains("Description: Archive from the toolbar\n"));
        assert!(prompt.contains("Steps:\n1. Select the first message\n2. Click Archive\n"));
        assert!(prompt.contains("Assertions:\n1. The message leaves the inbox\n"));
    }

    #[test]
    fn test_prompt_carries_rules_and_examples() {
        let prompt = build_prompt(&case());
        assert!(prompt.contains("TypeScript code only"));
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.contains("Example 2:"));
        assert!(prompt.ends_with("1. The message leaves the inbox\n"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt(&case()), build_prompt(&case()));
    }
}
