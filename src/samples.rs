use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub word: &'static str,
    pub sentence: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        word: "improve",
        sentence: "She worked hard to improve the design.",
    },
    Sample {
        word: "launch",
        sentence: "The team will launch the rocket at dawn.",
    },
    Sample {
        word: "harvest",
        sentence: "Farmers harvest the wheat before the autumn rains.",
    },
    Sample {
        word: "fragile",
        sentence: "Handle the fragile vase with both hands.",
    },
    Sample {
        word: "whisper",
        sentence: "He leaned over to whisper the secret.",
    },
    Sample {
        word: "glacier",
        sentence: "The glacier slowly carved a path through the valley.",
    },
];

pub fn random_sample<R: Rng + ?Sized>(rng: &mut R) -> Sample {
    SAMPLES.choose(rng).copied().unwrap_or(SAMPLES[0])
}
