//! Fixed prompt texts used by the optimization stages and the judge.

use super::render::PromptTemplate;

/// Persona shared by every optimizer stage.
pub const OPTIMIZER_SYSTEM_PROMPT: &str = r#"You are an expert prompt engineer. You design, critique and rewrite instructions for language models, with particular attention to smaller local models that need explicit, unambiguous guidance.

Rules you always follow:
1. Keep the intent of the user's task intact.
2. Prefer concrete, checkable instructions over vague adjectives.
3. Never answer the task yourself; only work on the prompt.
4. Wrap every prompt or piece of feedback you produce between <START> and <END> markers, one pair per item."#;

/// Turns a task description and a rough first prompt into one optimized prompt.
pub const INITIAL_PROMPT_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"A user wants a language model to perform the following task.

[Task description]
{taskDescription}

[User's initial prompt]
{initialPrompt}

Rewrite the initial prompt into a single, self-contained prompt that a small language model can follow reliably. Make the expected output format explicit, state any constraints implied by the task, and remove ambiguity. Keep it concise.

Return exactly one prompt wrapped as <START>prompt<END>."#,
);

/// Asks for the weaknesses of a prompt given example input it will be used on.
pub const CRITIQUE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"I am using the following prompt to instruct a language model:

[Prompt]
{instruction}

It will be applied to inputs like this:

[Examples]
{_examples_}

Act as a demanding reviewer. Identify the specific reasons this prompt could produce wrong, incomplete or poorly formatted answers for inputs like the examples. Consider missing context, unclear output format, unstated constraints and wording a small model may misread.

Return each distinct issue wrapped as <START>issue<END>."#,
);

/// Rewrites a prompt so that it addresses a critique.
pub const REFINE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"I am trying to improve the following prompt:

[Prompt]
{instruction}

A reviewer raised these issues:

[Critique]
{critique}

[Examples]
{_examples_}

Use the critique to write {steps_per_sample} different improved versions of the prompt. Every version must address the issues while keeping the original intent, and each version must be usable on its own.

Return each improved prompt wrapped as <START>prompt<END>."#,
);

/// Generates stylistic variations of a prompt primed by thinking styles.
pub const VARIANTS_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are generating alternative phrasings of a prompt for this task:

[Task description]
{task_description}

Draw on the following thinking styles when rewriting:
{meta_prompts}

[Prompt to vary]
{prompt_instruction}

Write {num_variations} variations of the prompt. Each variation should adopt a different thinking style from the list, keep the same task and output requirements, and read as a complete standalone prompt.

Return each variation wrapped as <START>variation<END>."#,
);

/// Substituted for `{_examples_}` when a stage runs without example input.
pub const NO_EXAMPLES_TEXT: &str = "(no example input provided)";

/// Rubric for the LLM judge.
pub const JUDGE_SYSTEM_PROMPT: &str = r#"You are an expert evaluator who scores the quality of LLM outputs. Score the output based on the following criteria:

1. Content Quality (0-40 points):
- Relevance to the task
- Accuracy and correctness
- Depth and comprehensiveness
- Information density

2. Language Complexity (0-30 points):
- Vocabulary richness
- Sentence structure variety
- Use of professional terminology
- Clarity and precision

3. Structure and Organization (0-30 points):
- Logical flow and coherence
- Proper formatting and layout
- Use of paragraphs and sections
- Transitional elements

Provide your evaluation in the following format:
<SCORE>
content_quality: [score]
language_complexity: [score]
structure_organization: [score]
total: [total_score]
</SCORE>

<REASON>
Brief explanation of the scoring (2-3 sentences)
</REASON>"#;

/// User message sent to the judge for one candidate.
pub const JUDGE_USER_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"Task Description: {task_description}

Prompt Used: {prompt}

Output to Evaluate: {output}

Please evaluate the output and provide scores."#,
);

/// Reasoning primes used to diversify generated variants.
pub const THINKING_STYLES: &[&str] = &[
    "How could I devise an experiment to help solve this problem?",
    "Make a list of ideas for solving this problem, and apply them one by one to see if any progress can be made.",
    "How could I measure progress on this problem?",
    "How can I simplify the problem so that it is easier to solve?",
    "What are the key assumptions underlying this problem?",
    "What are the potential risks and drawbacks of each solution?",
    "What are the alternative perspectives or viewpoints on this problem?",
    "What are the long-term implications of this problem and its solutions?",
    "How can I break down this problem into smaller, more manageable parts?",
    "Critical thinking: analyze the problem from different angles, question assumptions, and evaluate the available evidence.",
    "Try creative thinking: generate innovative and out-of-the-box ideas to solve the problem.",
    "Seek input and collaboration from others to solve the problem.",
    "Use systems thinking: consider the problem as part of a larger system of interrelated parts.",
    "Use risk analysis: evaluate the uncertainty and trade-offs associated with different options.",
    "Use reflective thinking: step back, consider the bigger picture, and revisit earlier conclusions.",
    "What is the core issue or problem that needs to be addressed?",
    "What are the underlying causes or factors contributing to the problem?",
    "Is the problem analytical, requiring data analysis, modeling or optimization?",
    "Let's think step by step.",
    "Let's make a step by step plan and implement it with good explanation.",
];
