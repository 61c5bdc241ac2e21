//! Line-oriented interactive session: pick a recipe, move the sliders, ask for music.
//!
//! Every `recommend` reruns the whole pipeline against the shared, read-only store.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::features::{Axis, Weights};
use crate::recommend::{self, RecommendError, RecommendOptions};
use crate::store::FeatureStore;

use super::{SelectionStyle, render_recommendations, render_selector, render_weights, snap_weight};

const HELP: &str = "\
Commands:
  list                      show the recipes
  select <name|number>      choose a recipe
  weight <axis> <value>     set sentiment/saturation/brightness weight (0.0-2.0, step 0.1)
  weights                   show current weights
  reset                     restore starting weights
  recommend | go            recommend music for the selected recipe
  help                      show this help
  quit                      leave";

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a> {
    store: &'a FeatureStore,
    options: RecommendOptions,
    image_dir: PathBuf,
    style: SelectionStyle,
    selected: usize,
    weights: Weights,
    initial_weights: Weights,
}

impl<'a> Session<'a> {
    pub fn new(
        store: &'a FeatureStore,
        options: RecommendOptions,
        image_dir: PathBuf,
        style: SelectionStyle,
        weights: Weights,
    ) -> Self {
        Self {
            store,
            options,
            image_dir,
            style,
            selected: 0,
            weights,
            initial_weights: weights,
        }
    }

    pub fn selected_recipe(&self) -> Option<&'a str> {
        self.store.recipe_at(self.selected).map(|r| r.name.as_str())
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Run until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> std::io::Result<()> {
        render_selector(out, self.store.recipes(), &self.image_dir, self.style, self.selected)?;
        writeln!(out)?;
        render_weights(out, &self.weights)?;
        writeln!(out, "Type 'help' for commands.")?;

        write!(out, "> ")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            if self.handle(line.trim(), out)? == Flow::Quit {
                break;
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> std::io::Result<Flow> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "list" | "ls" => {
                render_selector(
                    out,
                    self.store.recipes(),
                    &self.image_dir,
                    self.style,
                    self.selected,
                )?;
            }
            "select" => self.select(rest, out)?,
            "weight" => self.set_weight(rest, out)?,
            "weights" => render_weights(out, &self.weights)?,
            "reset" => {
                self.weights = self.initial_weights;
                render_weights(out, &self.weights)?;
            }
            "recommend" | "go" => self.recommend(out)?,
            "help" | "?" => writeln!(out, "{}", HELP)?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => writeln!(out, "Unknown command '{}'. Type 'help' for commands.", other)?,
        }
        Ok(Flow::Continue)
    }

    /// Select by exact name first, then by 1-based number.
    fn select<W: Write>(&mut self, arg: &str, out: &mut W) -> std::io::Result<()> {
        if arg.is_empty() {
            return writeln!(out, "Usage: select <name|number>");
        }

        let index = match self.store.find_recipe(arg) {
            Some((i, _)) => Some(i),
            None => arg
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=self.store.recipes().len()).contains(n))
                .map(|n| n - 1),
        };

        match index {
            Some(i) => {
                self.selected = i;
                writeln!(out, "Selected: {}", self.store.recipes()[i].name)
            }
            None => writeln!(
                out,
                "Error: {}",
                RecommendError::UnknownSelection(arg.to_string())
            ),
        }
    }

    fn set_weight<W: Write>(&mut self, args: &str, out: &mut W) -> std::io::Result<()> {
        let mut parts = args.split_whitespace();
        let (Some(axis), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return writeln!(out, "Usage: weight <sentiment|saturation|brightness> <value>");
        };

        let Some(axis) = Axis::parse(axis) else {
            return writeln!(out, "Error: unknown axis '{}'", axis);
        };
        let value = match value.parse::<f64>() {
            Ok(v) => v,
            Err(_) => return writeln!(out, "Error: '{}' is not a number", value),
        };

        let updated = snap_weight(value)
            .map_err(|e| e.to_string())
            .and_then(|v| self.weights.with(axis, v).map_err(|e| e.to_string()));
        match updated {
            Ok(weights) => {
                self.weights = weights;
                writeln!(out, "{} weight = {:.1}", axis, weights.get(axis))
            }
            Err(e) => writeln!(out, "Error: {}", e),
        }
    }

    fn recommend<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let Some(name) = self.selected_recipe() else {
            return writeln!(out, "Error: no recipe selected");
        };

        match recommend::recommend(self.store, name, &self.weights, &self.options) {
            Ok(recs) => render_recommendations(out, name, &recs),
            Err(e) => writeln!(out, "Error: {}", e),
        }
    }
}
