//! Built-in catalog: served when the store is unreachable and used to seed an empty store.

use crate::domain::{Complexity, Difficulty, Tool, ToolCategory, UseCase};

fn tool(
  id: &str,
  name: &str,
  description: &str,
  category: ToolCategory,
  capabilities: &[&str],
  complexity: Complexity,
) -> Tool {
  Tool {
    id: id.into(),
    name: name.into(),
    description: description.into(),
    category,
    icon: None,
    capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
    complexity,
  }
}

#[allow(clippy::too_many_arguments)]
fn use_case(
  id: &str,
  title: &str,
  description: &str,
  difficulty: Difficulty,
  required: &[&str],
  optional: &[&str],
  hints: &[&str],
  solution: &[&str],
) -> UseCase {
  let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  UseCase {
    id: id.into(),
    title: title.into(),
    description: description.into(),
    difficulty,
    required_tools: owned(required),
    optional_tools: owned(optional),
    hints: owned(hints),
    solution: owned(solution),
  }
}

pub fn builtin_tools() -> Vec<Tool> {
  use Complexity::{Advanced, Beginner, Intermediate};
  use ToolCategory::{Framework, Model, Tool as Library};
  vec![
    tool("openai-gpt4", "GPT-4", "Advanced language model that can understand and generate human-like text", Model,
      &["text generation", "summarization", "question answering", "translation"], Intermediate),
    tool("tensorflow", "TensorFlow", "Open-source machine learning framework developed by Google", Framework,
      &["neural networks", "deep learning", "model training", "model deployment"], Advanced),
    tool("huggingface", "Hugging Face Transformers", "Library of pre-trained models for natural language processing tasks", Library,
      &["text classification", "named entity recognition", "question answering", "summarization"], Intermediate),
    tool("pytorch", "PyTorch", "Open-source machine learning library developed by Facebook", Framework,
      &["neural networks", "computer vision", "natural language processing", "reinforcement learning"], Advanced),
    tool("dalle", "DALL-E", "AI system that can create realistic images and art from text descriptions", Model,
      &["image generation", "creative design", "visual concept rendering"], Beginner),
    tool("scikit-learn", "Scikit-learn", "Simple and efficient tools for data mining and data analysis", Library,
      &["classification", "regression", "clustering", "dimensionality reduction"], Intermediate),
    tool("langchain", "LangChain", "Framework for developing applications powered by language models", Framework,
      &["chatbots", "agents", "prompt management", "memory management"], Intermediate),
    tool("stable-diffusion", "Stable Diffusion", "Latent text-to-image diffusion model for generating detailed images", Model,
      &["image generation", "image editing", "inpainting", "outpainting"], Intermediate),
    tool("spacy", "spaCy", "Industrial-strength natural language processing library", Library,
      &["tokenization", "named entity recognition", "part-of-speech tagging", "dependency parsing"], Beginner),
    tool("llama", "Llama", "Large language model developed by Meta", Model,
      &["text generation", "reasoning", "creative writing", "code generation"], Intermediate),
    tool("nltk", "NLTK", "Platform for building Python programs to work with human language data", Library,
      &["tokenization", "stemming", "tagging", "parsing"], Beginner),
    tool("keras", "Keras", "High-level neural networks API, written in Python", Framework,
      &["neural networks", "deep learning", "model design", "model training"], Intermediate),
  ]
}

pub fn builtin_use_cases() -> Vec<UseCase> {
  use Difficulty::{Easy, Hard, Medium};
  vec![
    use_case(
      "text-summarization",
      "Text Summarization Service",
      "Build a service that can summarize long articles into concise summaries",
      Easy,
      &["openai-gpt4"],
      &["huggingface", "langchain", "nltk"],
      &[
        "Consider what language model would be best for understanding context",
        "Think about tools that can help with text processing",
        "You might need a framework to manage the interaction with the model",
      ],
      &["openai-gpt4", "langchain", "nltk"],
    ),
    use_case(
      "image-generator",
      "AI Art Generator",
      "Create a system that generates art based on text descriptions",
      Medium,
      &["dalle", "stable-diffusion"],
      &["pytorch", "tensorflow"],
      &[
        "You need models specialized in image generation",
        "Consider which framework would help optimize the generation process",
        "Think about how to process and prepare the text descriptions",
      ],
      &["dalle", "stable-diffusion", "pytorch"],
    ),
    use_case(
      "sentiment-analysis",
      "Social Media Sentiment Analyzer",
      "Develop a tool that analyzes the sentiment of social media posts",
      Medium,
      &["huggingface", "scikit-learn"],
      &["tensorflow", "spacy", "nltk"],
      &[
        "You need tools for text classification",
        "Consider what would help with linguistic analysis",
        "Think about statistical analysis tools",
      ],
      &["huggingface", "scikit-learn", "spacy"],
    ),
    use_case(
      "chatbot",
      "Customer Service Chatbot",
      "Build an intelligent chatbot that can handle customer service inquiries",
      Hard,
      &["openai-gpt4", "langchain"],
      &["huggingface", "llama", "tensorflow"],
      &[
        "You need a powerful language model for understanding customer queries",
        "Consider tools that help manage conversation flow and memory",
        "Think about frameworks that can integrate with existing systems",
      ],
      &["openai-gpt4", "langchain", "huggingface"],
    ),
    use_case(
      "code-assistant",
      "AI Code Assistant",
      "Create an AI-powered coding assistant that can suggest code completions and improvements",
      Hard,
      &["openai-gpt4", "llama"],
      &["huggingface", "langchain"],
      &[
        "You need models that excel at code generation",
        "Consider tools that can understand programming context",
        "Think about frameworks that can integrate with development environments",
      ],
      &["openai-gpt4", "llama", "langchain"],
    ),
    use_case(
      "object-detection",
      "Real-time Object Detection System",
      "Develop a system that can identify and track objects in video streams",
      Hard,
      &["tensorflow", "pytorch"],
      &["keras", "scikit-learn"],
      &[
        "You need frameworks specialized in computer vision",
        "Consider tools that can process real-time data efficiently",
        "Think about high-level APIs that simplify model development",
      ],
      &["tensorflow", "pytorch", "keras"],
    ),
  ]
}
