#[cfg(test)]
pub const POST_DATA_MD: &str = "[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
[DATE]: # (2022-04-02 12:05:00.000)
[AUTHOR]: # (dayong)
[TAGS]: # (career essay)
[SERIES]: # (Career)


# What I learned after 20+ years of software development
How to be a great software engineer?

Someone asked me this question today and I didn’t have an answer. After thinking for a while, I came up with a list of what I try to do myself.

Disclaimer: I don't think I am a great engineer, but I would love to have listened to that myself when I started my career, over 20 years ago.

I will divide this in parts, non-technical and technical

<!-- more -->

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
It's common to think you are awesome and the smartest person in the planet.
Some day in your life, you will find that you are not and that there are many developers much better than you. Not in capacity, but in wisdom and knowledge. __The earlier you find that, the better.__ This will drive you to improve yourself as you now recognize better your weakest points.
";

#[cfg(test)]
pub const POST_NO_HEADER_MD: &str = "# No header here
Text without any header block.
";
