//! Sample data loaded into fresh stores

/// Historical climate notes indexed by the in-memory retriever
pub const CLIMATE_HISTORY: &[&str] = &[
    "Coimbatore historical climate: Average annual temperature 24-28°C, monsoon season June-September with 600mm rainfall.",
    "Tamil Nadu weather patterns: Hot summers (35-40°C), moderate winters (20-25°C), southwest monsoon brings most rainfall.",
    "Coimbatore temperature trends: City experiences tropical wet and dry climate with moderate temperatures year-round.",
];

/// (topic, fact) rows for the fact table
pub const DEBATE_FACTS: &[(&str, &str)] = &[
    ("climate change", "Global temperatures have risen 1.1°C since pre-industrial times."),
    ("climate change", "CO2 levels are at 420 ppm, highest in 800,000 years."),
    ("climate change", "Sea levels have risen by 20 cm since 1900 due to melting ice caps and thermal expansion."),
    ("climate change", "Arctic sea ice has declined at a rate of 13% per decade since 1979."),
    ("climate change", "Ocean acidity has increased by 30% since the industrial revolution."),
    ("climate change", "Global sea level rise is accelerating, currently at 3.3 mm per year."),
    ("universal healthcare", "Countries with universal healthcare like Canada spend 10.8% of GDP on health, vs. 16.9% in the US."),
    ("universal healthcare", "Life expectancy in the US is 78.6 years, lower than 82.3 in countries with universal systems."),
    ("universal healthcare", "Over 28 million Americans remain uninsured as of 2023."),
    ("artificial intelligence", "AI could add $15.7 trillion to the global economy by 2030."),
    ("artificial intelligence", "By 2025, 85 million jobs may be displaced by AI, but 97 million new ones created."),
    ("artificial intelligence", "AI systems can perpetuate biases if trained on skewed data."),
    ("renewable energy", "Solar power costs have dropped 89% since 2010."),
    ("renewable energy", "Wind energy can supply over 35% of global electricity by 2050."),
    ("renewable energy", "Fossil fuels still account for 80% of global energy production as of 2023."),
];
