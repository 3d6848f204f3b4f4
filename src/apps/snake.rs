//! Snake, the first visual app.
//!
//! The board is `SNAKE_BOARD_WIDTH x SNAKE_BOARD_HEIGHT` cells in the top
//! left corner, its outer ring a `#` wall. The snake moves one cell every
//! `SNAKE_STEP_MS` milliseconds; hitting the wall or itself ends the game.

use alloc::collections::VecDeque;
use alloc::format;

use crate::app::VisualApp;
use crate::config::{SNAKE_BOARD_HEIGHT, SNAKE_BOARD_WIDTH, SNAKE_STEP_MS};
use crate::devices::framebuffer::{Color, ColorCode, TextScreen};
use crate::devices::input::KeyCode;

const START_LENGTH: usize = 3;
const MAX_LENGTH: usize = 100;
const FOOD_ATTEMPTS: usize = 100;

const WALL: u8 = b'#';
const HEAD: u8 = b'O';
const BODY: u8 = b'o';
const FOOD: u8 = b'*';

const WALL_COLOR: ColorCode = ColorCode::new(Color::LightGray, Color::Black);
const SNAKE_COLOR: ColorCode = ColorCode::new(Color::LightGreen, Color::Black);
const FOOD_COLOR: ColorCode = ColorCode::new(Color::LightRed, Color::Black);
const TEXT_COLOR: ColorCode = ColorCode::DEFAULT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::W | KeyCode::ARROW_UP => Some(Direction::Up),
            KeyCode::D | KeyCode::ARROW_RIGHT => Some(Direction::Right),
            KeyCode::S | KeyCode::ARROW_DOWN => Some(Direction::Down),
            KeyCode::A | KeyCode::ARROW_LEFT => Some(Direction::Left),
            _ => None,
        }
    }
}

pub struct SnakeGame {
    /// Head first.
    body: VecDeque<Position>,
    direction: Direction,
    /// Direction requested since the last step; applied on the next step so
    /// two quick turns cannot reverse the snake into itself.
    pending: Direction,
    food: Position,
    last_step_ms: u64,
    game_over: bool,
    rng: u32,
}

impl SnakeGame {
    pub fn new() -> Self {
        Self {
            body: VecDeque::with_capacity(MAX_LENGTH),
            direction: Direction::Right,
            pending: Direction::Right,
            food: Position { x: 0, y: 0 },
            last_step_ms: 0,
            game_over: false,
            rng: 1,
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.pending
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> usize {
        self.body.len().saturating_sub(START_LENGTH)
    }

    fn reset(&mut self, now_ms: u64) {
        let start = Position {
            x: SNAKE_BOARD_WIDTH / 2,
            y: SNAKE_BOARD_HEIGHT / 2,
        };
        self.body.clear();
        for i in 0..START_LENGTH as i32 {
            self.body.push_back(Position { x: start.x - i, y: start.y });
        }
        self.direction = Direction::Right;
        self.pending = Direction::Right;
        self.last_step_ms = now_ms;
        self.game_over = false;
        self.rng = (now_ms as u32) | 1;
        self.place_food();
    }

    fn next_random(&mut self) -> u32 {
        // xorshift32
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        x
    }

    fn place_food(&mut self) {
        for _ in 0..FOOD_ATTEMPTS {
            let x = 1 + (self.next_random() % (SNAKE_BOARD_WIDTH as u32 - 2)) as i32;
            let y = 1 + (self.next_random() % (SNAKE_BOARD_HEIGHT as u32 - 2)) as i32;
            let candidate = Position { x, y };
            if !self.body.contains(&candidate) {
                self.food = candidate;
                return;
            }
        }
    }

    fn is_wall(pos: Position) -> bool {
        pos.x <= 0
            || pos.y <= 0
            || pos.x >= SNAKE_BOARD_WIDTH - 1
            || pos.y >= SNAKE_BOARD_HEIGHT - 1
    }

    /// Moves one cell. Returns false when the move ends the game.
    fn step(&mut self) -> bool {
        let Some(head) = self.head() else {
            return false;
        };
        self.direction = self.pending;
        let (dx, dy) = self.direction.delta();
        let next = Position {
            x: head.x + dx,
            y: head.y + dy,
        };
        if Self::is_wall(next) {
            return false;
        }

        let eats = next == self.food;
        self.body.push_front(next);
        if !eats || self.body.len() > MAX_LENGTH {
            self.body.pop_back();
        }
        if self.body.iter().skip(1).any(|&p| p == next) {
            return false;
        }
        if eats {
            self.place_food();
        }
        true
    }

    fn draw(&self, screen: &mut dyn TextScreen) {
        screen.clear(TEXT_COLOR);
        for x in 0..SNAKE_BOARD_WIDTH {
            screen.put(WALL, WALL_COLOR, x as usize, 0);
            screen.put(WALL, WALL_COLOR, x as usize, (SNAKE_BOARD_HEIGHT - 1) as usize);
        }
        for y in 0..SNAKE_BOARD_HEIGHT {
            screen.put(WALL, WALL_COLOR, 0, y as usize);
            screen.put(WALL, WALL_COLOR, (SNAKE_BOARD_WIDTH - 1) as usize, y as usize);
        }

        screen.put(FOOD, FOOD_COLOR, self.food.x as usize, self.food.y as usize);
        for (i, segment) in self.body.iter().enumerate() {
            let glyph = if i == 0 { HEAD } else { BODY };
            screen.put(glyph, SNAKE_COLOR, segment.x as usize, segment.y as usize);
        }

        let status_row = SNAKE_BOARD_HEIGHT as usize + 1;
        screen.write_str_at(&format!("Score: {}", self.score()), TEXT_COLOR, 0, status_row);
        screen.write_str_at("WASD to steer, ESC to quit.", TEXT_COLOR, 0, status_row + 1);
    }

    fn draw_game_over(&self, screen: &mut dyn TextScreen) {
        screen.clear(TEXT_COLOR);
        let row = SNAKE_BOARD_HEIGHT as usize / 2;
        screen.write_str_at("Game Over!", TEXT_COLOR, 0, row);
        screen.write_str_at(&format!("Score: {}", self.score()), TEXT_COLOR, 0, row + 1);
        screen.write_str_at("Press ENTER or ESC to return to terminal.", TEXT_COLOR, 0, row + 2);
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualApp for SnakeGame {
    fn name(&self) -> &'static str {
        "snake"
    }

    fn init(&mut self, screen: &mut dyn TextScreen, now_ms: u64) {
        self.reset(now_ms);
        self.draw(screen);
    }

    fn on_key(&mut self, key: KeyCode, _screen: &mut dyn TextScreen) -> bool {
        if key == KeyCode::ESCAPE {
            return true;
        }
        if self.game_over {
            return key == KeyCode::ENTER;
        }
        if let Some(turn) = Direction::from_key(key) {
            if turn != self.direction.opposite() {
                self.pending = turn;
            }
        }
        false
    }

    fn tick(&mut self, screen: &mut dyn TextScreen, now_ms: u64) {
        if self.game_over || now_ms.saturating_sub(self.last_step_ms) < SNAKE_STEP_MS {
            return;
        }
        self.last_step_ms = now_ms;
        if self.step() {
            self.draw(screen);
        } else {
            self.game_over = true;
            self.draw_game_over(screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryScreen;

    fn started() -> (SnakeGame, MemoryScreen) {
        let mut game = SnakeGame::new();
        let mut screen = MemoryScreen::new();
        game.init(&mut screen, 1000);
        // Keep food out of the way of straight-line tests.
        game.food = Position { x: 1, y: 1 };
        (game, screen)
    }

    #[test]
    fn test_init_draws_board() {
        let (game, screen) = started();
        assert_eq!(game.len(), START_LENGTH);
        assert_eq!(screen.cell(0, 0), WALL);
        let corner = (SNAKE_BOARD_WIDTH as usize - 1, SNAKE_BOARD_HEIGHT as usize - 1);
        assert_eq!(screen.cell(corner.0, corner.1), WALL);
        let head = game.head().unwrap();
        assert_eq!(screen.cell(head.x as usize, head.y as usize), HEAD);
        assert_eq!(screen.cell(head.x as usize - 1, head.y as usize), BODY);
        assert!(screen.contains("Score: 0"));
    }

    #[test]
    fn test_food_starts_off_the_snake() {
        let mut game = SnakeGame::new();
        let mut screen = MemoryScreen::new();
        for seed in [0u64, 1, 7, 12345, 999_999] {
            game.init(&mut screen, seed);
            let food = game.food();
            assert!(!game.body.contains(&food));
            assert!(!SnakeGame::is_wall(food));
        }
    }

    #[test]
    fn test_moves_only_after_step_interval() {
        let (mut game, mut screen) = started();
        let start = game.head().unwrap();
        game.tick(&mut screen, 1000 + SNAKE_STEP_MS - 1);
        assert_eq!(game.head(), Some(start));
        game.tick(&mut screen, 1000 + SNAKE_STEP_MS);
        assert_eq!(game.head(), Some(Position { x: start.x + 1, y: start.y }));
        assert_eq!(game.len(), START_LENGTH);
    }

    #[test]
    fn test_turns_and_no_reversal() {
        let (mut game, mut screen) = started();
        assert!(!game.on_key(KeyCode::A, &mut screen));
        assert_eq!(game.direction(), Direction::Right);
        assert!(!game.on_key(KeyCode::W, &mut screen));
        assert_eq!(game.direction(), Direction::Up);

        let start = game.head().unwrap();
        game.tick(&mut screen, 1000 + SNAKE_STEP_MS);
        assert_eq!(game.head(), Some(Position { x: start.x, y: start.y - 1 }));
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let (mut game, mut screen) = started();
        game.on_key(KeyCode::W, &mut screen);
        game.on_key(KeyCode::A, &mut screen);
        let start = game.head().unwrap();
        game.tick(&mut screen, 1000 + SNAKE_STEP_MS);
        assert!(!game.is_over());
        assert_eq!(game.head(), Some(Position { x: start.x, y: start.y - 1 }));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let (mut game, mut screen) = started();
        let head = game.head().unwrap();
        game.food = Position { x: head.x + 1, y: head.y };
        game.tick(&mut screen, 1000 + SNAKE_STEP_MS);
        assert_eq!(game.len(), START_LENGTH + 1);
        assert_eq!(game.score(), 1);
        assert_ne!(game.food(), Position { x: head.x + 1, y: head.y });
        assert!(screen.contains("Score: 1"));
    }

    #[test]
    fn test_wall_ends_game_and_enter_exits() {
        let (mut game, mut screen) = started();
        let mut now = 1000;
        while !game.is_over() {
            now += SNAKE_STEP_MS;
            game.tick(&mut screen, now);
            assert!(now < 1000 + SNAKE_STEP_MS * 100, "snake never hit the wall");
        }
        assert!(screen.contains("Game Over!"));
        assert!(screen.contains("Press ENTER or ESC to return to terminal."));

        assert!(!game.on_key(KeyCode::W, &mut screen));
        assert!(game.on_key(KeyCode::ENTER, &mut screen));
    }

    #[test]
    fn test_escape_exits_any_time() {
        let (mut game, mut screen) = started();
        assert!(game.on_key(KeyCode::ESCAPE, &mut screen));
    }

    #[test]
    fn test_enter_ignored_while_playing() {
        let (mut game, mut screen) = started();
        assert!(!game.on_key(KeyCode::ENTER, &mut screen));
    }
}
