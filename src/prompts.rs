//! Per-branch generation prompts.
//!
//! Each branch gets its own self-contained instruction so a single completion
//! never has to carry the whole test. The text is assembled from a shared
//! frame plus a [`BranchTemplate`], with vocabulary picked by [`AgeTier`].

use std::fmt::Write as _;

use crate::state_machine::Branch;

/// Marker replaced with the target age inside worked examples.
const AGE_MARKER: &str = "{AGE}";

/// Vocabulary band a prompt is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeTier {
    /// 12 to 14.
    Early,
    /// 15 to 18.
    Late,
}

impl AgeTier {
    /// Ages outside 12..=18 are rejected before prompts are built; anything
    /// above 14 lands in the late tier.
    pub fn for_age(age: u8) -> Self {
        if age <= 14 { Self::Early } else { Self::Late }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Early => "12-14",
            Self::Late => "15-18",
        }
    }

    fn emotions(self) -> &'static str {
        match self {
            Self::Early => "clear, basic emotions (happy, sad, angry, scared, surprised)",
            Self::Late => "complex or mixed emotions (ambivalence, nostalgia, resignation, contempt)",
        }
    }

    fn social_settings(self) -> &'static str {
        match self {
            Self::Early => "simple social scenarios (school, friends, family)",
            Self::Late => {
                "nuanced social situations (romantic relationships, workplace, ethical dilemmas)"
            }
        }
    }

    fn tasks(self) -> &'static str {
        match self {
            Self::Early => "simple tasks (doing homework, making friends, playing sports)",
            Self::Late => {
                "complex tasks (long-term planning, leadership, critical analysis, career decisions)"
            }
        }
    }

    fn progressions(self) -> &'static str {
        match self {
            Self::Early => "simple progressions (sadness -> crying, annoyance -> anger) with obvious causes",
            Self::Late => {
                "complex progressions (disappointment -> resentment -> bitterness), subtle triggers and mixed emotions"
            }
        }
    }

    fn scenarios(self) -> &'static str {
        match self {
            Self::Early => {
                "school conflicts, peer pressure, test anxiety, friendship problems, parental conflicts"
            }
            Self::Late => {
                "romantic relationships, identity issues, future anxiety, complex moral dilemmas, workplace stress"
            }
        }
    }
}

/// A rendered prompt for one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPrompt {
    pub branch: Branch,
    pub text: String,
}

struct BranchTemplate {
    skill: &'static str,
    question_types: &'static [&'static str],
    /// Optional extra bullet list, e.g. tasks or scenarios to cover.
    coverage: Option<(&'static str, &'static [&'static str])>,
    scoring_intro: &'static str,
    scoring: &'static [&'static str],
    options_note: &'static str,
    example: &'static str,
}

impl BranchTemplate {
    fn adaptation(&self, branch: Branch, tier: AgeTier) -> String {
        match branch {
            Branch::Perceiving => format!("{}; {}", tier.emotions(), tier.social_settings()),
            Branch::Using => tier.tasks().to_string(),
            Branch::Understanding => tier.progressions().to_string(),
            Branch::Managing => format!("scenarios related to {}", tier.scenarios()),
        }
    }
}

/// The four prompts for `age`, in branch order.
///
/// Pure: the same age always yields the same text.
pub fn section_prompts(age: u8) -> [SectionPrompt; 4] {
    let tier = AgeTier::for_age(age);
    Branch::ALL.map(|branch| SectionPrompt {
        branch,
        text: render(branch, age, tier),
    })
}

fn render(branch: Branch, age: u8, tier: AgeTier) -> String {
    let template = template(branch);
    let header = branch.header();
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(
        out,
        "You are an expert psychometric test designer specializing in emotional intelligence \
         assessment for adolescents. Generate one section of an ability-based emotional \
         intelligence (EQ) test for {age}-year-old test takers, following these exact \
         specifications:"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{header} (3 questions)");
    let _ = writeln!(out);
    let _ = writeln!(out, "Skill Measured: {}", template.skill);
    let _ = writeln!(out);
    let _ = writeln!(out, "Question Types:");
    for kind in template.question_types {
        let _ = writeln!(out, "- {kind}");
    }
    if let Some((title, items)) = template.coverage {
        let _ = writeln!(out);
        let _ = writeln!(out, "{title}:");
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Age Adaptation:");
    let _ = writeln!(
        out,
        "- For {} year olds: Use {}",
        tier.label(),
        template.adaptation(branch, tier)
    );
    let _ = writeln!(out);
    let scoring = format!("Expert Consensus Scoring: {}", template.scoring_intro);
    let _ = writeln!(out, "{}", scoring.trim_end());
    for rule in template.scoring {
        let _ = writeln!(out, "- {rule}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Output Format Requirements:");
    let _ = writeln!(out);
    let _ = writeln!(out, "1. Branch Number: \"{header}\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "For each of the 3 questions, provide:");
    let _ = writeln!(out);
    let _ = writeln!(out, "2. Question Number");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "3. Scenario/Stimulus & Question: A clear scenario appropriate for a {age} year old, \
         followed by a question about it."
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "4. 4-5 Answer Options: Multiple choice options (A, B, C, D, E){}",
        template.options_note
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "5. Expert Consensus Scores: An answer-score mapping assigning 1-5 points to every option"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(out, "Example Format:");
    let _ = writeln!(out);
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out);
    out.push_str(&template.example.replace(AGE_MARKER, &age.to_string()));
    out
}

fn template(branch: Branch) -> &'static BranchTemplate {
    match branch {
        Branch::Perceiving => &PERCEIVING,
        Branch::Using => &USING,
        Branch::Understanding => &UNDERSTANDING,
        Branch::Managing => &MANAGING,
    }
}

static PERCEIVING: BranchTemplate = BranchTemplate {
    skill: "Identifying and recognizing emotions in facial expressions, body language, tone, and situations.",
    question_types: &[
        "Face/image analysis: describe a facial expression and ask which emotions are present",
        "Scenario-based emotion identification: present a situation and ask what the person is likely feeling",
        "Tone/context interpretation: given a statement or context, identify the underlying emotions",
    ],
    coverage: None,
    scoring_intro: "Rate each emotion option from 1-5 by how accurately it reflects the stimulus",
    scoring: &[
        "Most accurate emotion identification = 5 points",
        "Partially accurate = 3-4 points",
        "Incorrect/contradictory = 1 point",
    ],
    options_note: "",
    example: "\
Question 1

Scenario & Question: [Age {AGE}] Sarah walks into the cafeteria and sees her friends laughing together. When she reaches the table they stop talking and glance at each other. One of them says \"Oh hey, Sarah\" in a flat tone. Which emotions is Sarah most likely experiencing?

Options:
A) Excitement and joy
B) Confusion and hurt
C) Anger and aggression
D) Indifference and calm
E) Mild curiosity

Expert Consensus Scores: A: 1, B: 5, C: 2, D: 1, E: 3

Question 2

Scenario & Question: [Age {AGE}] A person's eyebrows are pulled slightly together and upward, the corners of their mouth turn down, and they are looking down and away. Which emotions is this person most likely feeling?

Options:
A) Happiness and excitement
B) Disgust and anger
C) Sadness and disappointment
D) Fear and surprise
E) Confidence and pride

Expert Consensus Scores: A: 1, B: 2, C: 5, D: 3, E: 1

Question 3

Scenario & Question: [Age {AGE}] Alex practiced a solo for weeks. After the performance the audience is silent for a moment before clapping. Alex walks off stage, takes a deep breath and says \"Well, I'm just glad it's over\" while avoiding eye contact. Which emotions is Alex most likely experiencing?

Options:
A) Pure relief and satisfaction
B) Disappointment and anxiety about the performance
C) Boredom and indifference
D) Anger towards the audience
E) Pride and excitement for the next opportunity

Expert Consensus Scores: A: 2, B: 5, C: 1, D: 1, E: 3
",
};

static USING: BranchTemplate = BranchTemplate {
    skill: "Understanding which emotions help with specific tasks and using emotions strategically.",
    question_types: &[
        "Task-emotion matching: \"What emotion would be most helpful for [specific task]?\"",
        "Mood optimization: \"If you want to [achieve goal], which emotional state would help most?\"",
        "Emotional leverage: scenarios where emotions can enhance thinking or problem-solving",
    ],
    coverage: Some((
        "Common Tasks to Include",
        &[
            "Creative brainstorming",
            "Detail-oriented work",
            "Making careful decisions",
            "Connecting with others",
            "Learning new material",
        ],
    )),
    scoring_intro: "",
    scoring: &[
        "Most facilitating emotion = 5 points",
        "Somewhat helpful = 3-4 points",
        "Neutral/unhelpful = 2 points",
        "Counterproductive = 1 point",
    ],
    options_note: "",
    example: "\
Question 1

Scenario & Question: [Age {AGE}] You have an open-ended class project that needs a completely original idea. You are in the brainstorming phase, trying to come up with as many possibilities as you can. Which emotional state would be MOST helpful for this part of the task?

Options:
A) Calm contentment
B) Anxious worry
C) Playful curiosity
D) Serious skepticism
E) Frustrated determination

Expert Consensus Scores: A: 3, B: 1, C: 5, D: 2, E: 1

Question 2

Scenario & Question: [Age {AGE}] You are about to proofread an application for a summer program you really want to join. This is your last check for spelling, grammar and formatting mistakes. Which emotional state would be MOST helpful for catching every detail?

Options:
A) Excited enthusiasm
B) Focused calm
C) Confident pride
D) Playful humor
E) Impatient eagerness

Expert Consensus Scores: A: 2, B: 5, C: 3, D: 1, E: 1

Question 3

Scenario & Question: [Age {AGE}] After a small disagreement there is still some tension between you and a friend. You decide to talk it out so you can reconnect and understand their side. Which emotional approach would be MOST helpful for this conversation?

Options:
A) Defensive, to protect your own feelings
B) Empathetic and open-minded
C) Apologetic, even if you are not sure what you did wrong
D) Lighthearted, joking about the situation right away
E) Neutral and unemotional

Expert Consensus Scores: A: 1, B: 5, C: 3, D: 2, E: 2
",
};

static UNDERSTANDING: BranchTemplate = BranchTemplate {
    skill: "Comprehending how emotions arise, evolve, and combine; understanding emotional cause and effect.",
    question_types: &[
        "Emotional progression: \"If [initial emotion] continues, what emotion might develop next?\"",
        "Cause analysis: \"What most likely caused this person to feel [emotion]?\"",
        "Emotional blends: \"When someone feels [emotion A] and [emotion B] together, this is called [what]?\"",
        "Intensity scaling: ordering emotions by intensity (annoyance -> frustration -> anger -> rage)",
    ],
    coverage: None,
    scoring_intro: "",
    scoring: &[
        "Most accurate progression/cause = 5 points",
        "Partially correct = 3 points",
        "Incorrect/illogical = 1 point",
    ],
    options_note: "",
    example: "\
Question 1

Scenario & Question: [Age {AGE}] Alex spent weeks on a science fair project and put in extra hours to make it perfect, but did not place in the top three. If Alex's first feeling is deep disappointment, what emotion is LIKELY to follow if Alex cannot process it?

Options:
A) Gratitude for the experience
B) Apathy towards science
C) Renewed motivation to try harder
D) Confusion about the judging
E) Increased confidence

Expert Consensus Scores: A: 1, B: 5, C: 3, D: 2, E: 1

Question 2

Scenario & Question: [Age {AGE}] Jamie suddenly feels a mix of nervousness and excited anticipation, with a racing heart and butterflies in the stomach. What is the MOST likely cause of this blend?

Options:
A) Forgetting a homework assignment
B) A surprise quiz in a difficult class
C) Being about to perform a solo in the school concert
D) Hearing a loud, unexpected noise
E) Being given extra chores at home

Expert Consensus Scores: A: 2, B: 3, C: 5, D: 1, E: 1

Question 3

Scenario & Question: [Age {AGE}] Which sequence shows the most accurate progression of anger from mildest to most intense?

Options:
A) Rage -> Frustration -> Annoyance -> Fury
B) Annoyance -> Frustration -> Anger -> Rage
C) Irritation -> Fury -> Resentment -> Annoyance
D) Frustration -> Annoyance -> Rage -> Anger
E) Anger -> Annoyance -> Fury -> Frustration

Expert Consensus Scores: A: 1, B: 5, C: 2, D: 1, E: 1
",
};

static MANAGING: BranchTemplate = BranchTemplate {
    skill: "Regulating one's own emotions and managing emotions in relationships effectively.",
    question_types: &[
        "Strategy effectiveness: someone experiences an emotion; rate various coping strategies",
        "Interpersonal regulation: how to help someone else manage their emotions",
        "Self-regulation: best approaches for managing one's own state in a challenging situation",
    ],
    coverage: Some((
        "Scenarios Should Include",
        &[
            "Anxiety/stress management",
            "Anger/frustration regulation",
            "Sadness/disappointment coping",
            "Interpersonal conflict resolution",
            "Social pressure situations",
        ],
    )),
    scoring_intro: "Rate each strategy's effectiveness",
    scoring: &[
        "Highly effective (healthy, adaptive, evidence-based) = 5 points",
        "Moderately effective = 3 points",
        "Ineffective or counterproductive (avoidance, suppression, aggression) = 1 point",
    ],
    options_note: " representing different coping strategies",
    example: "\
Question 1

Scenario & Question: [Age {AGE}] Sam has an important final exam in one hour and feels extremely anxious, with a racing mind and shaky hands. What is the MOST effective thing Sam can do in the next 15 minutes to get into a better headspace?

Options:
A) Suppress the feelings and think about something else entirely.
B) Find a quiet spot for a few minutes of deep breathing and positive self-talk.
C) Cram as much last-minute information as possible.
D) Complain to friends about how unfair the test is.
E) Skip the exam to avoid the feeling.

Expert Consensus Scores: A: 2, B: 5, C: 2, D: 1, E: 1

Question 2

Scenario & Question: [Age {AGE}] Taylor is furious after a teammate's mistakes cost the team the championship game, and is about to confront them. What is the MOST effective way for Taylor to manage this anger in the moment?

Options:
A) Yell at the teammate immediately to release the anger.
B) Walk away, cool down for 10 minutes, then talk about it calmly.
C) Give the teammate the silent treatment for the rest of the day.
D) Post about the teammate's mistake on social media.
E) Bottle up the anger and pretend everything is fine.

Expert Consensus Scores: A: 1, B: 5, C: 1, D: 1, E: 1

Question 3

Scenario & Question: [Age {AGE}] Your friend Riley is crying after a fight with their parents and says \"They never listen to me!\" What is the MOST effective way to help Riley?

Options:
A) Tell them to calm down because it is not a big deal.
B) Immediately offer advice on how to fix the problem.
C) Listen, show you are there for them, and validate their feelings.
D) Change the subject to a funny video.
E) Agree with them and criticize their parents.

Expert Consensus Scores: A: 1, B: 2, C: 5, D: 2, E: 1
",
};
